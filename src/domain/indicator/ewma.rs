//! Exponentially weighted moving average with span-based decay.
//!
//! alpha = 2/(span+1). The value at i is the adjusted weighted mean of every
//! close seen so far, weight (1-alpha)^(i-j) for close j:
//!   num[i] = C[i] + (1-alpha)*num[i-1],  den[i] = 1 + (1-alpha)*den[i-1]
//!   EWMA[i] = num[i] / den[i]
//! Warmup: first (span-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub fn calculate_ewma(prices: &PriceSeries, span: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(prices.len());
    let decay = 1.0 - 2.0 / (span as f64 + 1.0);
    let mut num = 0.0;
    let mut den = 0.0;

    for (i, bar) in prices.bars().iter().enumerate() {
        num = bar.close + decay * num;
        den = 1.0 + decay * den;

        if span == 0 || i + 1 < span {
            values.push(IndicatorPoint::undefined(bar.date));
        } else {
            values.push(IndicatorPoint::defined(bar.date, num / den));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ewma(span),
        values,
    }
}
