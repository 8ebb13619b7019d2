//! Screen, tracker and universe settings, read from a [`ConfigPort`].
//!
//! Every key is optional; defaults reproduce the classic VCP screen
//! (EWMA 30/50/150/200, slope window 20, 52-week window of 260 bars).

use crate::domain::config_validation::{validate_screen_config, validate_tracker_config};
use crate::domain::error::VcpError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SCREEN_SECTION: &str = "screen";
pub const TRACKER_SECTION: &str = "tracker";
pub const UNIVERSE_SECTION: &str = "universe";

/// EWMA spans, shortest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageWindows {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
    pub longest: usize,
}

impl Default for MovingAverageWindows {
    fn default() -> Self {
        Self {
            short: 30,
            medium: 50,
            long: 150,
            longest: 200,
        }
    }
}

impl MovingAverageWindows {
    pub fn all(&self) -> [usize; 4] {
        [self.short, self.medium, self.long, self.longest]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum gain above the 52-week low, as a fraction.
    pub off_low_min: f64,
    /// Open band around the 52-week high: lower < (C - high)/high < upper.
    pub near_high_lower: f64,
    pub near_high_upper: f64,
    /// Minimum return over the relative-strength lag.
    pub relative_strength_min: f64,
    /// Maximum (max - min)/min over the contraction window.
    pub contraction_max: f64,
    /// Slope angles must exceed this to count as trending up.
    pub slope_min_angle: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            off_low_min: 0.30,
            near_high_lower: -0.15,
            near_high_upper: 0.15,
            relative_strength_min: 0.89,
            contraction_max: 0.10,
            slope_min_angle: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub ma_windows: MovingAverageWindows,
    pub slope_window: usize,
    pub year_window: usize,
    pub pivot_window: usize,
    pub contraction_window: usize,
    pub relative_strength_lag: usize,
    pub thresholds: Thresholds,
    pub horizons: Vec<usize>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            ma_windows: MovingAverageWindows::default(),
            slope_window: 20,
            year_window: 5 * 52,
            pivot_window: 5,
            contraction_window: 10,
            relative_strength_lag: 250,
            thresholds: Thresholds::default(),
            horizons: vec![1, 3, 5, 7],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub ema_fast: usize,
    pub ema_medium: usize,
    pub ema_slow: usize,
    pub ema_long: usize,
    /// Bars in the ranking regression, plus the current one.
    pub lookback: usize,
    pub top: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ema_fast: 10,
            ema_medium: 20,
            ema_slow: 50,
            ema_long: 200,
            lookback: 252 / 2,
            top: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

pub fn build_screen_config(config: &dyn ConfigPort) -> Result<ScreenConfig, VcpError> {
    let defaults = ScreenConfig::default();
    let s = SCREEN_SECTION;

    let screen = ScreenConfig {
        ma_windows: MovingAverageWindows {
            short: read_usize(config, s, "ma_short", defaults.ma_windows.short)?,
            medium: read_usize(config, s, "ma_medium", defaults.ma_windows.medium)?,
            long: read_usize(config, s, "ma_long", defaults.ma_windows.long)?,
            longest: read_usize(config, s, "ma_longest", defaults.ma_windows.longest)?,
        },
        slope_window: read_usize(config, s, "slope_window", defaults.slope_window)?,
        year_window: read_usize(config, s, "year_window", defaults.year_window)?,
        pivot_window: read_usize(config, s, "pivot_window", defaults.pivot_window)?,
        contraction_window: read_usize(config, s, "contraction_window", defaults.contraction_window)?,
        relative_strength_lag: read_usize(
            config,
            s,
            "relative_strength_lag",
            defaults.relative_strength_lag,
        )?,
        thresholds: Thresholds {
            off_low_min: read_f64(config, s, "off_low_min", defaults.thresholds.off_low_min)?,
            near_high_lower: read_f64(
                config,
                s,
                "near_high_lower",
                defaults.thresholds.near_high_lower,
            )?,
            near_high_upper: read_f64(
                config,
                s,
                "near_high_upper",
                defaults.thresholds.near_high_upper,
            )?,
            relative_strength_min: read_f64(
                config,
                s,
                "relative_strength_min",
                defaults.thresholds.relative_strength_min,
            )?,
            contraction_max: read_f64(
                config,
                s,
                "contraction_max",
                defaults.thresholds.contraction_max,
            )?,
            slope_min_angle: read_f64(
                config,
                s,
                "slope_min_angle",
                defaults.thresholds.slope_min_angle,
            )?,
        },
        horizons: match config.get_string(s, "horizons") {
            Some(raw) => parse_horizons(&raw)?,
            None => defaults.horizons,
        },
    };

    validate_screen_config(&screen)?;
    Ok(screen)
}

pub fn build_tracker_config(config: &dyn ConfigPort) -> Result<TrackerConfig, VcpError> {
    let defaults = TrackerConfig::default();
    let t = TRACKER_SECTION;

    let tracker = TrackerConfig {
        ema_fast: read_usize(config, t, "ema_fast", defaults.ema_fast)?,
        ema_medium: read_usize(config, t, "ema_medium", defaults.ema_medium)?,
        ema_slow: read_usize(config, t, "ema_slow", defaults.ema_slow)?,
        ema_long: read_usize(config, t, "ema_long", defaults.ema_long)?,
        lookback: read_usize(config, t, "lookback", defaults.lookback)?,
        top: read_usize(config, t, "top", defaults.top)?,
    };

    validate_tracker_config(&tracker)?;
    Ok(tracker)
}

pub fn build_date_range(config: &dyn ConfigPort) -> Result<DateRange, VcpError> {
    let start = read_date(config, UNIVERSE_SECTION, "start_date")?;
    let end = read_date(config, UNIVERSE_SECTION, "end_date")?;

    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(VcpError::invalid_config(
                UNIVERSE_SECTION,
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(DateRange { start, end })
}

pub fn parse_horizons(raw: &str) -> Result<Vec<usize>, VcpError> {
    let invalid = |reason: &str| VcpError::invalid_config(SCREEN_SECTION, "horizons", reason);

    let mut horizons = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid("empty entry in horizon list"));
        }
        let h: usize = token
            .parse()
            .map_err(|_| invalid(&format!("'{}' is not a whole number", token)))?;
        horizons.push(h);
    }
    Ok(horizons)
}

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, VcpError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            VcpError::invalid_config(
                section,
                key,
                format!("'{}' is not a non-negative integer", raw.trim()),
            )
        }),
    }
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, VcpError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| VcpError::invalid_config(section, key, format!("'{}' is not a number", raw.trim()))),
    }
}

fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, VcpError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                VcpError::invalid_config(section, key, "invalid date format (expected YYYY-MM-DD)")
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn port(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_yields_defaults() {
        let config = build_screen_config(&port("[data]\npath = x\n")).unwrap();
        assert_eq!(config, ScreenConfig::default());
        assert_eq!(config.ma_windows.all(), [30, 50, 150, 200]);
        assert_eq!(config.year_window, 260);
        assert_eq!(config.horizons, vec![1, 3, 5, 7]);
    }

    #[test]
    fn overrides_are_read() {
        let config = build_screen_config(&port(
            "[screen]\nma_short = 10\nslope_window = 5\ncontraction_max = 0.2\nhorizons = 2, 4\n",
        ))
        .unwrap();

        assert_eq!(config.ma_windows.short, 10);
        assert_eq!(config.slope_window, 5);
        assert!((config.thresholds.contraction_max - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.horizons, vec![2, 4]);
    }

    #[test]
    fn non_numeric_window_is_invalid() {
        let err = build_screen_config(&port("[screen]\nma_long = abc\n")).unwrap_err();
        assert!(matches!(err, VcpError::ConfigInvalid { key, .. } if key == "ma_long"));
    }

    #[test]
    fn non_numeric_threshold_is_invalid() {
        let err = build_screen_config(&port("[screen]\noff_low_min = lots\n")).unwrap_err();
        assert!(matches!(err, VcpError::ConfigInvalid { key, .. } if key == "off_low_min"));
    }

    #[test]
    fn parse_horizons_rejects_empty_entry() {
        assert!(parse_horizons("1,,3").is_err());
        assert!(parse_horizons("1,x").is_err());
        assert_eq!(parse_horizons(" 7 ").unwrap(), vec![7]);
    }

    #[test]
    fn tracker_defaults() {
        let config = build_tracker_config(&port("[tracker]\n")).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.lookback, 126);
    }

    #[test]
    fn date_range_parses_and_orders() {
        let range = build_date_range(&port(
            "[universe]\nstart_date = 2020-01-01\nend_date = 2020-12-31\n",
        ))
        .unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()));

        let err = build_date_range(&port(
            "[universe]\nstart_date = 2021-01-01\nend_date = 2020-12-31\n",
        ))
        .unwrap_err();
        assert!(matches!(err, VcpError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn open_date_range_contains_everything() {
        let range = DateRange::default();
        assert!(range.contains(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
    }

    #[test]
    fn bad_date_is_invalid() {
        let err = build_date_range(&port("[universe]\nend_date = 2020/12/31\n")).unwrap_err();
        assert!(matches!(err, VcpError::ConfigInvalid { key, .. } if key == "end_date"));
    }
}
