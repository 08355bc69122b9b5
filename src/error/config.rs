// Configuration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 3001-3003
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Config file could not be read
    pub const IO: i32 = 3001;

    /// Config file is not valid JSON for `ClassifierConfig`
    pub const PARSE: i32 = 3002;

    /// A tunable is outside its accepted range
    pub const INVALID_PARAMETER: i32 = 3003;
}

/// Log a configuration error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_config_error(err: &ConfigError, context: &str) {
    error!(
        "Config error in {}: code={}, component=ClassifierConfig, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Configuration-related errors
///
/// Error code range: 3001-3003
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read
    Io { path: String, reason: String },

    /// Config file contents could not be parsed
    Parse { reason: String },

    /// A tunable failed validation
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<f64>, reason: &'static str) -> Self {
        ConfigError::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::Io { .. } => ConfigErrorCodes::IO,
            ConfigError::Parse { .. } => ConfigErrorCodes::PARSE,
            ConfigError::InvalidParameter { .. } => ConfigErrorCodes::INVALID_PARAMETER,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::Io { path, reason } => {
                format!("Failed to read config {}: {}", path, reason)
            }
            ConfigError::Parse { reason } => format!("Invalid config JSON: {}", reason),
            ConfigError::InvalidParameter {
                name,
                value,
                reason,
            } => format!("Invalid parameter {} = {}: {}", name, value, reason),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}
