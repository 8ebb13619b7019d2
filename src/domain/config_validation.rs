//! Configuration validation.
//!
//! Runs after parsing, so every field already has the right type; these
//! checks cover ranges and cross-field constraints.

use crate::domain::error::VcpError;
use crate::domain::screen_config::{ScreenConfig, TrackerConfig, SCREEN_SECTION, TRACKER_SECTION};

pub fn validate_screen_config(config: &ScreenConfig) -> Result<(), VcpError> {
    validate_ma_windows(config)?;
    validate_windows(config)?;
    validate_thresholds(config)?;
    validate_horizons(config)?;
    Ok(())
}

pub fn validate_tracker_config(config: &TrackerConfig) -> Result<(), VcpError> {
    for (key, value) in [
        ("ema_fast", config.ema_fast),
        ("ema_medium", config.ema_medium),
        ("ema_slow", config.ema_slow),
        ("ema_long", config.ema_long),
        ("top", config.top),
    ] {
        positive(TRACKER_SECTION, key, value)?;
    }
    if config.lookback < 1 {
        return Err(VcpError::invalid_config(
            TRACKER_SECTION,
            "lookback",
            "lookback must be at least 1",
        ));
    }
    Ok(())
}

fn validate_ma_windows(config: &ScreenConfig) -> Result<(), VcpError> {
    let ma = &config.ma_windows;
    for (key, value) in [
        ("ma_short", ma.short),
        ("ma_medium", ma.medium),
        ("ma_long", ma.long),
        ("ma_longest", ma.longest),
    ] {
        positive(SCREEN_SECTION, key, value)?;
    }
    Ok(())
}

fn validate_windows(config: &ScreenConfig) -> Result<(), VcpError> {
    if config.slope_window < 2 {
        return Err(VcpError::invalid_config(
            SCREEN_SECTION,
            "slope_window",
            "slope_window must be at least 2",
        ));
    }
    positive(SCREEN_SECTION, "year_window", config.year_window)?;
    positive(SCREEN_SECTION, "pivot_window", config.pivot_window)?;
    positive(SCREEN_SECTION, "contraction_window", config.contraction_window)?;
    positive(SCREEN_SECTION, "relative_strength_lag", config.relative_strength_lag)?;
    Ok(())
}

fn validate_thresholds(config: &ScreenConfig) -> Result<(), VcpError> {
    let t = &config.thresholds;
    for (key, value) in [
        ("off_low_min", t.off_low_min),
        ("near_high_lower", t.near_high_lower),
        ("near_high_upper", t.near_high_upper),
        ("relative_strength_min", t.relative_strength_min),
        ("contraction_max", t.contraction_max),
        ("slope_min_angle", t.slope_min_angle),
    ] {
        if !value.is_finite() {
            return Err(VcpError::invalid_config(
                SCREEN_SECTION,
                key,
                format!("{} must be a finite number", key),
            ));
        }
    }

    if t.near_high_lower >= t.near_high_upper {
        return Err(VcpError::invalid_config(
            SCREEN_SECTION,
            "near_high_lower",
            "near_high_lower must be below near_high_upper",
        ));
    }

    if t.slope_min_angle <= -90.0 || t.slope_min_angle >= 90.0 {
        return Err(VcpError::invalid_config(
            SCREEN_SECTION,
            "slope_min_angle",
            "slope_min_angle must be between -90 and 90 degrees",
        ));
    }
    Ok(())
}

fn validate_horizons(config: &ScreenConfig) -> Result<(), VcpError> {
    if config.horizons.is_empty() {
        return Err(VcpError::invalid_config(
            SCREEN_SECTION,
            "horizons",
            "at least one horizon is required",
        ));
    }
    if config.horizons.contains(&0) {
        return Err(VcpError::invalid_config(
            SCREEN_SECTION,
            "horizons",
            "horizons must be positive",
        ));
    }
    Ok(())
}

fn positive(section: &str, key: &str, value: usize) -> Result<(), VcpError> {
    if value == 0 {
        return Err(VcpError::invalid_config(
            section,
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(())
}
