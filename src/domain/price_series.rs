//! Daily closing-price history for one symbol, plus the unified timeline
//! used when many symbols are replayed together.

use crate::domain::error::VcpError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered `(date, close)` bars. Dates are strictly increasing and every close
/// is finite; all window computations index the bars positionally.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, VcpError> {
        let symbol = symbol.into();

        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(VcpError::InvalidInput {
                    reason: format!("{}: non-finite close on {}", symbol, bar.date),
                });
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(VcpError::InvalidInput {
                    reason: format!(
                        "{}: dates not strictly increasing at {} (after {})",
                        symbol,
                        bar.date,
                        bars[i - 1].date
                    ),
                });
            }
        }

        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        Ok(Self {
            symbol,
            bars,
            date_index,
        })
    }

    /// Builds a series from closes on consecutive calendar days starting at `start`.
    pub fn from_closes(
        symbol: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, VcpError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&PriceBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    /// The first `len` bars, as a new series.
    pub fn prefix(&self, len: usize) -> PriceSeries {
        let bars = self.bars[..len.min(self.bars.len())].to_vec();
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        PriceSeries {
            symbol: self.symbol.clone(),
            bars,
            date_index,
        }
    }
}

pub fn build_unified_timeline(series: &[PriceSeries]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|bar| bar.date))
        .collect();
    unique_dates.into_iter().collect()
}
