// Error types for the virtual flute engine
//
// This module defines custom error types for audio and configuration
// operations, providing structured error handling with stable error codes.

mod audio;
mod config;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use config::{log_config_error, ConfigError, ConfigErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so the CLI and log output report failures
/// consistently.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
