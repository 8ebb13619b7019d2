//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: a time series of indicator values aligned to the prices
//!
//! A point with `valid == false` is undefined: its `value` is a zero
//! placeholder and is never handed out by [`IndicatorSeries::get`].

pub mod ewma;
pub mod lag;
pub mod rolling;
pub mod slope;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn defined(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }

    pub fn undefined(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorType {
    Ewma(usize),
    /// Slope angle of `Ewma(source)` over a trailing `window`.
    SlopeAngle { source: usize, window: usize },
    RollingMin(usize),
    RollingMax(usize),
    RollingMean(usize),
    Lag(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` when out of range or still warming up.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ewma(span) => write!(f, "EWMA({})", span),
            IndicatorType::SlopeAngle { source, window } => {
                write!(f, "SLOPE(EWMA({}),{})", source, window)
            }
            IndicatorType::RollingMin(n) => write!(f, "MIN({})", n),
            IndicatorType::RollingMax(n) => write!(f, "MAX({})", n),
            IndicatorType::RollingMean(n) => write!(f, "MEAN({})", n),
            IndicatorType::Lag(n) => write!(f, "LAG({})", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Ewma(30).to_string(), "EWMA(30)");
        assert_eq!(
            IndicatorType::SlopeAngle {
                source: 200,
                window: 20
            }
            .to_string(),
            "SLOPE(EWMA(200),20)"
        );
        assert_eq!(IndicatorType::RollingMin(260).to_string(), "MIN(260)");
        assert_eq!(IndicatorType::RollingMax(10).to_string(), "MAX(10)");
        assert_eq!(IndicatorType::RollingMean(5).to_string(), "MEAN(5)");
        assert_eq!(IndicatorType::Lag(250).to_string(), "LAG(250)");
    }

    #[test]
    fn get_skips_undefined_points() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Ewma(2),
            values: vec![IndicatorPoint::undefined(d(1)), IndicatorPoint::defined(d(2), 4.5)],
        };
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), Some(4.5));
        assert_eq!(series.get(2), None);
        assert_eq!(series.first_valid_index(), Some(1));
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Ewma(30), "short");
        map.insert(IndicatorType::Ewma(200), "long");
        map.insert(IndicatorType::RollingMin(5), "pivot low");

        assert_eq!(map.get(&IndicatorType::Ewma(30)), Some(&"short"));
        assert_eq!(map.get(&IndicatorType::RollingMin(5)), Some(&"pivot low"));
        assert_eq!(map.get(&IndicatorType::RollingMax(5)), None);
    }
}
