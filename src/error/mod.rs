// Error types for the emotion classifier
//
// The per-frame pipeline is total and never fails. Errors only arise at the
// edges: loading and validating configuration.

mod config;

pub use config::{log_config_error, ConfigError, ConfigErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so hosts can report failures consistently.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
