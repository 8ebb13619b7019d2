//! The eleven VCP criteria and their AND-combination.
//!
//! Every criterion reads only defined indicator values at the same index. A
//! criterion whose inputs are undefined (warm-up, short history) or whose
//! ratio is not finite evaluates to `false`.

use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_panel::IndicatorPanel;
use crate::domain::screen_config::ScreenConfig;
use chrono::NaiveDate;
use std::fmt;

pub const CRITERIA_COUNT: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Criterion {
    AboveLongAverages,
    MediumAverageOrder,
    LongAverageRising,
    ShortAverageOrder,
    AboveShortAverage,
    OffYearLow,
    NearYearHigh,
    RelativeStrength,
    PivotBreakout,
    VolatilityContraction,
    ShortAverageRising,
}

impl Criterion {
    pub const ALL: [Criterion; CRITERIA_COUNT] = [
        Criterion::AboveLongAverages,
        Criterion::MediumAverageOrder,
        Criterion::LongAverageRising,
        Criterion::ShortAverageOrder,
        Criterion::AboveShortAverage,
        Criterion::OffYearLow,
        Criterion::NearYearHigh,
        Criterion::RelativeStrength,
        Criterion::PivotBreakout,
        Criterion::VolatilityContraction,
        Criterion::ShortAverageRising,
    ];

    /// Zero-based column index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based criterion number, as used in reports.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    pub fn description(self) -> &'static str {
        match self {
            Criterion::AboveLongAverages => "close above long moving averages",
            Criterion::MediumAverageOrder => "long MA above longest MA",
            Criterion::LongAverageRising => "longest MA trending up",
            Criterion::ShortAverageOrder => "medium MA above long MA above longest MA",
            Criterion::AboveShortAverage => "close above medium MA",
            Criterion::OffYearLow => "well off the 52-week low",
            Criterion::NearYearHigh => "near the 52-week high",
            Criterion::RelativeStrength => "relative strength over the lag",
            Criterion::PivotBreakout => "close above the pivot",
            Criterion::VolatilityContraction => "price range contracted",
            Criterion::ShortAverageRising => "short MA trending up",
        }
    }

    /// `None` when any input is undefined.
    fn check(self, panel: &IndicatorPanel, config: &ScreenConfig, i: usize) -> Option<bool> {
        let ma = &config.ma_windows;
        let t = &config.thresholds;
        let close = panel.close(i)?;
        let value = |indicator: IndicatorType| panel.value(&indicator, i);
        let ewma = |span: usize| value(IndicatorType::Ewma(span));
        let slope = |span: usize| {
            value(IndicatorType::SlopeAngle {
                source: span,
                window: config.slope_window,
            })
        };

        let passed = match self {
            Criterion::AboveLongAverages => close > ewma(ma.long)? && close > ewma(ma.longest)?,
            Criterion::MediumAverageOrder => ewma(ma.long)? > ewma(ma.longest)?,
            Criterion::LongAverageRising => slope(ma.longest)? > t.slope_min_angle,
            Criterion::ShortAverageOrder => {
                let long = ewma(ma.long)?;
                ewma(ma.medium)? > long && long > ewma(ma.longest)?
            }
            Criterion::AboveShortAverage => close > ewma(ma.medium)?,
            Criterion::OffYearLow => {
                let low = value(IndicatorType::RollingMin(config.year_window))?;
                relative_change(close, low)? > t.off_low_min
            }
            Criterion::NearYearHigh => {
                let high = value(IndicatorType::RollingMax(config.year_window))?;
                let distance = relative_change(close, high)?;
                t.near_high_lower < distance && distance < t.near_high_upper
            }
            Criterion::RelativeStrength => {
                let base = value(IndicatorType::Lag(config.relative_strength_lag))?;
                relative_change(close, base)? > t.relative_strength_min
            }
            Criterion::PivotBreakout => {
                let n = config.pivot_window;
                let pivot = (value(IndicatorType::RollingMean(n))?
                    + value(IndicatorType::RollingMax(n))?
                    + value(IndicatorType::RollingMin(n))?)
                    / 3.0;
                close > pivot
            }
            Criterion::VolatilityContraction => {
                let n = config.contraction_window;
                let high = value(IndicatorType::RollingMax(n))?;
                let low = value(IndicatorType::RollingMin(n))?;
                relative_change(high, low)? < t.contraction_max
            }
            Criterion::ShortAverageRising => slope(ma.short)? > t.slope_min_angle,
        };
        Some(passed)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{} ({})", self.number(), self.description())
    }
}

/// (value - base) / base, or `None` when the ratio is not finite.
fn relative_change(value: f64, base: f64) -> Option<f64> {
    let ratio = (value - base) / base;
    ratio.is_finite().then_some(ratio)
}

/// Eleven boolean columns aligned to the price dates, indexed by
/// [`Criterion::index`].
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaPanel {
    pub dates: Vec<NaiveDate>,
    pub columns: [Vec<bool>; CRITERIA_COUNT],
}

impl CriteriaPanel {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, criterion: Criterion) -> &[bool] {
        &self.columns[criterion.index()]
    }

    pub fn row(&self, index: usize) -> [bool; CRITERIA_COUNT] {
        std::array::from_fn(|c| self.columns[c][index])
    }

    pub fn fulfillment(&self) -> FulfillmentSeries {
        let values = (0..self.len()).map(|i| all_fulfilled(&self.row(i))).collect();
        FulfillmentSeries {
            dates: self.dates.clone(),
            values,
        }
    }
}

pub fn all_fulfilled(row: &[bool]) -> bool {
    row.len() == CRITERIA_COUNT && row.iter().all(|&c| c)
}

pub fn evaluate_criteria(panel: &IndicatorPanel, config: &ScreenConfig) -> CriteriaPanel {
    let columns = Criterion::ALL.map(|criterion| {
        (0..panel.len())
            .map(|i| criterion.check(panel, config, i).unwrap_or(false))
            .collect()
    });

    CriteriaPanel {
        dates: panel.dates.clone(),
        columns,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<bool>,
}

impl FulfillmentSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on the most recent observation.
    pub fn latest(&self) -> Option<bool> {
        self.values.last().copied()
    }

    pub fn fulfilled_indices(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }
}
