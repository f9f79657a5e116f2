//! Error types for logging operations.

use std::fmt;
use std::io;

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Errors that can occur while configuring or using a logger.
#[derive(Debug)]
pub enum LoggingError {
    /// I/O error from the file sink.
    Io(io::Error),
    /// A level name that does not match any [`crate::LogLevel`].
    InvalidLevel(String),
    /// The in-memory capture buffer was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(err) => write!(f, "I/O error: {}", err),
            LoggingError::InvalidLevel(level) => write!(f, "Invalid log level: {}", level),
            LoggingError::Poisoned => write!(f, "Log capture buffer poisoned"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoggingError {
    fn from(err: io::Error) -> Self {
        LoggingError::Io(err)
    }
}
