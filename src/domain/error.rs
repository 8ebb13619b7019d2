//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for vcpscreen.
#[derive(Debug, thiserror::Error)]
pub enum VcpError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VcpError {
    pub(crate) fn invalid_config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        VcpError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&VcpError> for std::process::ExitCode {
    fn from(err: &VcpError) -> Self {
        let code: u8 = match err {
            VcpError::Io(_) => 1,
            VcpError::ConfigParse { .. }
            | VcpError::ConfigMissing { .. }
            | VcpError::ConfigInvalid { .. }
            | VcpError::Universe(_) => 2,
            VcpError::DataSource { .. } => 3,
            VcpError::InvalidInput { .. } => 4,
            VcpError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_input() {
        let err = VcpError::InvalidInput {
            reason: "empty price series".into(),
        };
        assert_eq!(err.to_string(), "invalid input: empty price series");
    }

    #[test]
    fn display_config_invalid() {
        let err = VcpError::invalid_config("screen", "slope_window", "must be at least 2");
        assert_eq!(
            err.to_string(),
            "invalid config value [screen] slope_window: must be at least 2"
        );
    }

    #[test]
    fn universe_error_is_transparent() {
        let err = VcpError::from(UniverseError::DuplicateSymbol("AAPL".into()));
        assert_eq!(err.to_string(), "duplicate symbol: AAPL");
    }
}
