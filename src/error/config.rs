// Configuration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 2001-2004
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Smoothing window must hold at least one observation
    pub const INVALID_SMOOTHING_WINDOW: i32 = 2001;

    /// A ratio or distance threshold is out of range
    pub const INVALID_THRESHOLD: i32 = 2002;

    /// Match score exceeds the number of fingering bits
    pub const INVALID_MATCH_SCORE: i32 = 2003;

    /// A timing interval is unusable
    pub const INVALID_INTERVAL: i32 = 2004;
}

/// Log a configuration error with structured context
pub fn log_config_error(err: &ConfigError, context: &str) {
    error!(
        "Config error in {}: code={}, component=AppConfig, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Configuration validation errors
///
/// Raised when a session is constructed from values the pipeline cannot
/// run with. Loading itself never fails (missing files fall back to
/// defaults), so these only surface from `AppConfig::validate`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Smoothing window must hold at least one observation
    InvalidSmoothingWindow { window: usize },

    /// A ratio or distance threshold is out of range
    InvalidThreshold { name: &'static str, value: f32 },

    /// Match score exceeds the number of fingering bits
    InvalidMatchScore { score: u8 },

    /// A timing interval is unusable
    InvalidInterval { name: &'static str, millis: u64 },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidSmoothingWindow { .. } => {
                ConfigErrorCodes::INVALID_SMOOTHING_WINDOW
            }
            ConfigError::InvalidThreshold { .. } => ConfigErrorCodes::INVALID_THRESHOLD,
            ConfigError::InvalidMatchScore { .. } => ConfigErrorCodes::INVALID_MATCH_SCORE,
            ConfigError::InvalidInterval { .. } => ConfigErrorCodes::INVALID_INTERVAL,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::InvalidSmoothingWindow { window } => {
                format!("Smoothing window must be at least 1 (got {})", window)
            }
            ConfigError::InvalidThreshold { name, value } => {
                format!("Threshold {} is out of range (got {})", name, value)
            }
            ConfigError::InvalidMatchScore { score } => {
                format!("Match score must be between 0 and 8 (got {})", score)
            }
            ConfigError::InvalidInterval { name, millis } => {
                format!("Interval {} is invalid (got {} ms)", name, millis)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_codes() {
        assert_eq!(
            ConfigError::InvalidSmoothingWindow { window: 0 }.code(),
            2001
        );
        assert_eq!(
            ConfigError::InvalidThreshold {
                name: "smoothing.threshold",
                value: 1.5
            }
            .code(),
            2002
        );
        assert_eq!(ConfigError::InvalidMatchScore { score: 9 }.code(), 2003);
        assert_eq!(
            ConfigError::InvalidInterval {
                name: "playback.retrigger_interval_ms",
                millis: 0
            }
            .code(),
            2004
        );
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::InvalidSmoothingWindow { window: 0 };
        assert!(err.message().contains("at least 1"));

        let err = ConfigError::InvalidMatchScore { score: 9 };
        assert!(err.message().contains("got 9"));

        let err = ConfigError::InvalidThreshold {
            name: "tracking.finger_down_distance",
            value: -1.0,
        };
        assert!(format!("{}", err).contains("tracking.finger_down_distance"));
    }
}
