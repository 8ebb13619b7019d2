//! Universe screening: fetch, evaluate and collect forward returns per symbol.

use crate::domain::error::VcpError;
use crate::domain::evaluator::{Evaluation, PatternEvaluator};
use crate::domain::forward_returns::ForwardReturns;
use crate::domain::screen_config::{DateRange, ScreenConfig};
use crate::ports::data_port::DataPort;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub evaluation: Evaluation,
    pub forward: ForwardReturns,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    Fetch(String),
    Invalid(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no price data in range"),
            SkipReason::Fetch(reason) => write!(f, "fetch failed: {}", reason),
            SkipReason::Invalid(reason) => write!(f, "invalid data: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenReport {
    pub outcomes: BTreeMap<String, ScreenOutcome>,
    pub skipped: Vec<SkippedSymbol>,
}

impl ScreenReport {
    /// Symbols fulfilling the pattern on their latest bar, in symbol order.
    pub fn flagged(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.evaluation.latest_fulfilled())
            .map(|(symbol, _)| symbol.as_str())
            .collect()
    }

    pub fn outcome(&self, symbol: &str) -> Option<&ScreenOutcome> {
        self.outcomes.get(symbol)
    }
}

/// Screens every symbol independently. A symbol that cannot be fetched or
/// evaluated is recorded as skipped and the run carries on.
pub fn screen_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    config: &ScreenConfig,
    range: DateRange,
) -> ScreenReport {
    let evaluator = PatternEvaluator::new(config.clone());
    let mut report = ScreenReport::default();

    for symbol in symbols {
        match screen_symbol(data_port, &evaluator, symbol, range) {
            Ok(outcome) => {
                report.outcomes.insert(symbol.clone(), outcome);
            }
            Err(reason) => {
                warn!("skipping {}: {}", symbol, reason);
                report.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    info!(
        "screened {} symbols: {} evaluated, {} flagged, {} skipped",
        symbols.len(),
        report.outcomes.len(),
        report.flagged().len(),
        report.skipped.len()
    );
    report
}

fn screen_symbol(
    data_port: &dyn DataPort,
    evaluator: &PatternEvaluator,
    symbol: &str,
    range: DateRange,
) -> Result<ScreenOutcome, SkipReason> {
    let prices = data_port.fetch_prices(symbol, range).map_err(|e| match e {
        VcpError::NoData { .. } => SkipReason::NoData,
        VcpError::InvalidInput { reason } => SkipReason::Invalid(reason),
        other => SkipReason::Fetch(other.to_string()),
    })?;
    if prices.is_empty() {
        return Err(SkipReason::NoData);
    }

    let evaluation = evaluator
        .evaluate(&prices)
        .map_err(|e| SkipReason::Invalid(e.to_string()))?;
    let forward = ForwardReturns::compute(&evaluation, &evaluator.config().horizons);
    Ok(ScreenOutcome {
        evaluation,
        forward,
    })
}
