//! Builds every indicator the VCP criteria read, each as its own series,
//! and assembles them into one panel keyed by [`IndicatorType`].

use crate::domain::indicator::ewma::calculate_ewma;
use crate::domain::indicator::lag::calculate_lag;
use crate::domain::indicator::rolling::{
    calculate_rolling_max, calculate_rolling_mean, calculate_rolling_min,
};
use crate::domain::indicator::slope::calculate_slope_angle;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;
use crate::domain::screen_config::ScreenConfig;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct IndicatorPanel {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorPanel {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn get(&self, indicator: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(indicator)
    }

    /// Defined value of `indicator` at `index`, if any.
    pub fn value(&self, indicator: &IndicatorType, index: usize) -> Option<f64> {
        self.series.get(indicator).and_then(|s| s.get(index))
    }

    pub fn close(&self, index: usize) -> Option<f64> {
        self.closes.get(index).copied()
    }

    /// Indicator identities in stable order.
    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        let mut types: Vec<_> = self.series.keys().copied().collect();
        types.sort();
        types
    }
}

/// Indicator identities the criteria need under `config`.
pub fn required_indicators(config: &ScreenConfig) -> Vec<IndicatorType> {
    let ma = &config.ma_windows;
    let mut types: Vec<IndicatorType> = ma.all().into_iter().map(IndicatorType::Ewma).collect();
    types.extend([
        IndicatorType::SlopeAngle {
            source: ma.longest,
            window: config.slope_window,
        },
        IndicatorType::SlopeAngle {
            source: ma.short,
            window: config.slope_window,
        },
        IndicatorType::RollingMin(config.year_window),
        IndicatorType::RollingMax(config.year_window),
        IndicatorType::RollingMean(config.pivot_window),
        IndicatorType::RollingMin(config.pivot_window),
        IndicatorType::RollingMax(config.pivot_window),
        IndicatorType::RollingMin(config.contraction_window),
        IndicatorType::RollingMax(config.contraction_window),
        IndicatorType::Lag(config.relative_strength_lag),
    ]);
    types.sort();
    types.dedup();
    types
}

pub fn compute_indicator_panel(prices: &PriceSeries, config: &ScreenConfig) -> IndicatorPanel {
    let mut series = HashMap::new();
    let mut ewmas: HashMap<usize, IndicatorSeries> = HashMap::new();

    // Slopes read their EWMA, so EWMAs come first in the sort order.
    for indicator in required_indicators(config) {
        let computed = match indicator {
            IndicatorType::Ewma(span) => {
                let s = calculate_ewma(prices, span);
                ewmas.insert(span, s.clone());
                s
            }
            IndicatorType::SlopeAngle { source, window } => match ewmas.get(&source) {
                Some(base) => calculate_slope_angle(base, source, window),
                None => calculate_slope_angle(&calculate_ewma(prices, source), source, window),
            },
            IndicatorType::RollingMin(n) => calculate_rolling_min(prices, n),
            IndicatorType::RollingMax(n) => calculate_rolling_max(prices, n),
            IndicatorType::RollingMean(n) => calculate_rolling_mean(prices, n),
            IndicatorType::Lag(n) => calculate_lag(prices, n),
        };
        series.insert(indicator, computed);
    }

    IndicatorPanel {
        dates: prices.dates(),
        closes: prices.closes(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_prices(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes("TEST", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), closes)
            .unwrap()
    }

    #[test]
    fn required_indicators_default() {
        let types = required_indicators(&ScreenConfig::default());
        assert_eq!(types.len(), 14);
        assert!(types.contains(&IndicatorType::Ewma(150)));
        assert!(types.contains(&IndicatorType::SlopeAngle {
            source: 200,
            window: 20
        }));
        assert!(types.contains(&IndicatorType::RollingMax(260)));
        assert!(types.contains(&IndicatorType::Lag(250)));
    }

    #[test]
    fn required_indicators_dedup_shared_windows() {
        let mut config = ScreenConfig::default();
        config.contraction_window = config.pivot_window;
        let types = required_indicators(&config);
        assert_eq!(types.len(), 12);
    }

    #[test]
    fn panel_series_align_with_prices() {
        let closes: Vec<f64> = (0..300).map(|i| 50.0 + i as f64 * 0.1).collect();
        let panel = compute_indicator_panel(&make_prices(&closes), &ScreenConfig::default());

        assert_eq!(panel.len(), 300);
        for indicator in panel.indicator_types() {
            assert_eq!(panel.get(&indicator).unwrap().len(), 300, "{}", indicator);
        }
        assert_eq!(panel.close(299), Some(closes[299]));
    }

    #[test]
    fn panel_warmups() {
        let closes: Vec<f64> = (0..300).map(|i| 50.0 + i as f64 * 0.1).collect();
        let panel = compute_indicator_panel(&make_prices(&closes), &ScreenConfig::default());

        let first = |t: IndicatorType| panel.get(&t).unwrap().first_valid_index();
        assert_eq!(first(IndicatorType::Ewma(200)), Some(199));
        assert_eq!(first(IndicatorType::Ewma(30)), Some(29));
        assert_eq!(
            first(IndicatorType::SlopeAngle {
                source: 200,
                window: 20
            }),
            Some(218)
        );
        assert_eq!(
            first(IndicatorType::SlopeAngle {
                source: 30,
                window: 20
            }),
            Some(48)
        );
        assert_eq!(first(IndicatorType::RollingMin(260)), Some(259));
        assert_eq!(first(IndicatorType::Lag(250)), Some(250));
    }

    #[test]
    fn value_reads_defined_points_only() {
        let panel = compute_indicator_panel(&make_prices(&[10.0; 40]), &ScreenConfig::default());
        assert_eq!(panel.value(&IndicatorType::Ewma(30), 28), None);
        assert!(panel.value(&IndicatorType::Ewma(30), 29).is_some());
        assert_eq!(panel.value(&IndicatorType::Ewma(200), 39), None);
        assert_eq!(panel.value(&IndicatorType::Ewma(7), 39), None);
    }
}
