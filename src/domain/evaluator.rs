//! Pattern evaluation: price series in, criteria and fulfillment out.

use crate::domain::criteria::{CriteriaPanel, FulfillmentSeries, evaluate_criteria};
use crate::domain::error::VcpError;
use crate::domain::indicator_panel::{IndicatorPanel, compute_indicator_panel};
use crate::domain::price_series::PriceSeries;
use crate::domain::screen_config::ScreenConfig;
use chrono::NaiveDate;
use log::debug;

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub symbol: String,
    pub indicators: IndicatorPanel,
    pub criteria: CriteriaPanel,
    pub fulfillment: FulfillmentSeries,
}

impl Evaluation {
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.indicators.closes
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.indicators.dates
    }

    /// Whether the pattern holds on the most recent observation.
    pub fn latest_fulfilled(&self) -> bool {
        self.fulfillment.latest().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternEvaluator {
    config: ScreenConfig,
}

impl PatternEvaluator {
    pub fn new(config: ScreenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Recomputes every indicator and criterion from scratch. Short histories
    /// evaluate to all-false; only an empty series is rejected.
    pub fn evaluate(&self, prices: &PriceSeries) -> Result<Evaluation, VcpError> {
        if prices.is_empty() {
            return Err(VcpError::InvalidInput {
                reason: format!("{}: empty price series", prices.symbol()),
            });
        }

        let indicators = compute_indicator_panel(prices, &self.config);
        let criteria = evaluate_criteria(&indicators, &self.config);
        let fulfillment = criteria.fulfillment();

        debug!(
            "{}: {} bars, {} fulfilled, latest {}",
            prices.symbol(),
            prices.len(),
            fulfillment.count(),
            fulfillment.latest().unwrap_or(false)
        );

        Ok(Evaluation {
            symbol: prices.symbol().to_string(),
            indicators,
            criteria,
            fulfillment,
        })
    }
}
