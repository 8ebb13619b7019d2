//! Trailing rolling-window statistics over closing prices.
//!
//! ROLL(n)[i] = f(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_rolling_min(prices: &PriceSeries, period: usize) -> IndicatorSeries {
    rolling(prices, period, IndicatorType::RollingMin(period), |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

pub fn calculate_rolling_max(prices: &PriceSeries, period: usize) -> IndicatorSeries {
    rolling(prices, period, IndicatorType::RollingMax(period), |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn calculate_rolling_mean(prices: &PriceSeries, period: usize) -> IndicatorSeries {
    rolling(prices, period, IndicatorType::RollingMean(period), |w| {
        w.iter().sum::<f64>() / w.len() as f64
    })
}

fn rolling(
    prices: &PriceSeries,
    period: usize,
    indicator_type: IndicatorType,
    stat: impl Fn(&[f64]) -> f64,
) -> IndicatorSeries {
    let closes = prices.closes();
    let values = prices
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                IndicatorPoint::undefined(bar.date)
            } else {
                IndicatorPoint::defined(bar.date, stat(&closes[i + 1 - period..=i]))
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
