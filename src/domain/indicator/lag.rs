//! Lagged close: LAG(n)[i] = C[i-n]. Warmup: first n bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_lag(prices: &PriceSeries, periods: usize) -> IndicatorSeries {
    let bars = prices.bars();
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match i.checked_sub(periods) {
            Some(j) => IndicatorPoint::defined(bar.date, bars[j].close),
            None => IndicatorPoint::undefined(bar.date),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Lag(periods),
        values,
    }
}
