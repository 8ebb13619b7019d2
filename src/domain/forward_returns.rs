//! Forward returns after fulfilled observations.
//!
//! A diagnostic of how the signal would have played out; it reads future
//! prices and is never fed back into the criteria.

use crate::domain::evaluator::Evaluation;
use chrono::NaiveDate;

/// (C[t+h] - C[t]) / C[t], or `None` when t + h is past the end of the series.
pub fn forward_return(closes: &[f64], index: usize, horizon: usize) -> Option<f64> {
    let future = *closes.get(index.checked_add(horizon)?)?;
    let current = *closes.get(index)?;
    let ret = (future - current) / current;
    ret.is_finite().then_some(ret)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardReturnRow {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
    /// One entry per horizon, in horizon order.
    pub returns: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardReturns {
    pub symbol: String,
    pub horizons: Vec<usize>,
    pub rows: Vec<ForwardReturnRow>,
}

impl ForwardReturns {
    pub fn compute(evaluation: &Evaluation, horizons: &[usize]) -> Self {
        let closes = evaluation.closes();
        let rows = evaluation
            .fulfillment
            .fulfilled_indices()
            .into_iter()
            .map(|index| ForwardReturnRow {
                index,
                date: evaluation.dates()[index],
                close: closes[index],
                returns: horizons
                    .iter()
                    .map(|&h| forward_return(closes, index, h))
                    .collect(),
            })
            .collect();

        Self {
            symbol: evaluation.symbol.clone(),
            horizons: horizons.to_vec(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Defined returns for the horizon at position `h_idx`.
    pub fn defined(&self, h_idx: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.returns.get(h_idx).copied().flatten())
            .collect()
    }

    pub fn summarize(&self) -> Vec<ReturnSummary> {
        self.horizons
            .iter()
            .enumerate()
            .map(|(h_idx, &horizon)| ReturnSummary::from_values(horizon, &self.defined(h_idx)))
            .collect()
    }
}

/// Descriptive statistics over the defined returns of one horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSummary {
    pub horizon: usize,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n-1); needs two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ReturnSummary {
    pub fn from_values(horizon: usize, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();

        let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Self {
            horizon,
            count,
            mean,
            std,
            min: sorted.first().copied(),
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
