//! Trailing-window slope angle.
//!
//! For every window of `n` consecutive values, both axes (the values and the
//! index 0..n-1) are min-max scaled to [0, 1], an OLS line with intercept is
//! fitted, and the slope is reported as atan(slope) in degrees. Scaling makes
//! the angle independent of the series' price level.
//!
//! The angle for the window ending at i sits at position i. The first (n-1)
//! positions have no full window and are undefined. A flat window has slope 0.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

/// Windows whose range is within this fraction of their level count as flat,
/// so rounding noise in a smoothed constant does not read as a trend.
const FLAT_TOLERANCE: f64 = 1e-12;

/// Slope angles of `values` over a trailing `window`. `None` marks positions
/// without a full window; the result always has `values.len()` entries.
pub fn slope_angle(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut angles = vec![None; values.len()];
    if window < 2 || window > values.len() {
        return angles;
    }

    for end in window..=values.len() {
        angles[end - 1] = Some(window_angle(&values[end - window..end]));
    }
    angles
}

/// Slope angles of an indicator series. A window touching any undefined
/// source point is itself undefined.
pub fn calculate_slope_angle(
    source: &IndicatorSeries,
    source_span: usize,
    window: usize,
) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = source
        .values
        .iter()
        .map(|p| IndicatorPoint::undefined(p.date))
        .collect();

    if window >= 2 && window <= source.len() {
        let raw: Vec<f64> = source.values.iter().map(|p| p.value).collect();
        for end in window..=source.len() {
            let start = end - window;
            if source.values[start..end].iter().all(|p| p.valid) {
                let point = &mut values[end - 1];
                point.valid = true;
                point.value = window_angle(&raw[start..end]);
            }
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::SlopeAngle {
            source: source_span,
            window,
        },
        values,
    }
}

/// Angle in degrees of the normalized OLS fit over one window (len >= 2).
fn window_angle(window: &[f64]) -> f64 {
    let (lo, hi) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if !range.is_finite() || range <= FLAT_TOLERANCE * lo.abs().max(hi.abs()) {
        return 0.0;
    }

    let n = window.len() as f64;
    let x_span = n - 1.0;
    let xs = (0..window.len()).map(|i| i as f64 / x_span);
    let ys = window.iter().map(|&v| (v - lo) / range);

    let x_mean = 0.5;
    let y_mean = ys.clone().sum::<f64>() / n;

    let (cov, var) = xs.zip(ys).fold((0.0, 0.0), |(cov, var), (x, y)| {
        let dx = x - x_mean;
        (cov + dx * (y - y_mean), var + dx * dx)
    });

    (cov / var).atan().to_degrees()
}
