//! The [`Logger`] handle shared by the protocol crates.
//!
//! A logger never blocks its caller: the file sink hands records to a writer
//! thread, and the memory sink only pushes onto a shared buffer. The memory
//! sink is what sans-I/O state machines use when the embedding application
//! owns all I/O, and what tests use to assert on emitted lines.

use crate::error::Result;
use crate::log_level::LogLevel;
use crate::log_message::LogMessage;
use crate::log_writer::Sink;
use std::path::PathBuf;

/// Cloneable, level-filtered logger.
///
/// Every clone and every [`Logger::for_component`] derivative writes to the
/// same sink.
///
/// # Examples
///
/// ```
/// use logging::{LogLevel, Logger};
///
/// let logger = Logger::in_memory(LogLevel::Info);
/// let stun = logger.for_component("STUN");
/// stun.info("Binding request sent");
/// stun.debug("filtered out");
///
/// let lines = logger.captured().unwrap();
/// assert_eq!(lines.len(), 1);
/// assert!(lines[0].ends_with("INFO [STUN]: Binding request sent"));
/// ```
#[derive(Clone)]
pub struct Logger {
    sink: Sink,
    level: LogLevel,
    component: Option<String>,
}

impl Logger {
    /// Creates a logger appending to `log_path` from a dedicated writer thread.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be created or opened.
    pub fn new(log_path: PathBuf, level: LogLevel) -> Result<Self> {
        Ok(Logger {
            sink: Sink::file(&log_path)?,
            level,
            component: None,
        })
    }

    /// Creates a logger printing to stdout.
    pub fn console(level: LogLevel) -> Self {
        Logger {
            sink: Sink::Console,
            level,
            component: None,
        }
    }

    /// Creates a logger that keeps every accepted line in memory.
    ///
    /// Lines are retrieved with [`Logger::captured`].
    pub fn in_memory(level: LogLevel) -> Self {
        Logger {
            sink: Sink::memory(),
            level,
            component: None,
        }
    }

    /// Returns a logger tagged with `component` that shares this logger's sink and level.
    pub fn for_component(&self, component: &str) -> Self {
        Logger {
            sink: self.sink.clone(),
            level: self.level,
            component: Some(component.to_string()),
        }
    }

    /// Minimum level this logger records.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether a message at `level` would be recorded.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Lines captured by an in-memory logger; empty for file and console loggers.
    pub fn captured(&self) -> Result<Vec<String>> {
        self.sink.captured()
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            self.sink.write(LogMessage::new(
                level,
                self.component.clone(),
                message.to_string(),
            ));
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("component", &self.component)
            .finish()
    }
}
