//! Error types for FileBuddy
//!
//! Covers setup and plumbing failures (configuration, serialization, batch
//! input). Tool calls themselves never surface these: every filesystem
//! failure is folded into a `ToolFailure` at the tool boundary.

use thiserror::Error;

/// Main error type for the FileBuddy runtime
#[derive(Error, Debug)]
pub enum FileBuddyError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed tool invocation (batch line, CLI argument)
    #[error("Invalid tool call: {0}")]
    InvalidCall(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Logging subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    LoggingError(String),
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, FileBuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FileBuddyError::ConfigError("max_parallel must be greater than 0".to_string());
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(err.to_string().contains("max_parallel"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FileBuddyError = io.into();
        assert!(matches!(err, FileBuddyError::IoError(_)));
        assert!(err.to_string().contains("gone"));
    }
}
