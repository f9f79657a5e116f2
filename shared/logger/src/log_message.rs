//! Internal log message structure.

use crate::log_level::LogLevel;
use chrono::Local;

/// A single formatted-on-demand log record.
#[derive(Debug, Clone)]
pub(crate) struct LogMessage {
    pub timestamp: String,
    pub level: LogLevel,
    pub component: Option<String>,
    pub message: String,
}

impl LogMessage {
    /// Creates a record stamped with the current local time.
    pub fn new(level: LogLevel, component: Option<String>, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level,
            component,
            message,
        }
    }

    /// Formats the record as `[timestamp] LEVEL [component]: message`, without a newline.
    pub fn format_line(&self) -> String {
        match self.component {
            Some(ref component) => format!(
                "[{}] {} [{}]: {}",
                self.timestamp,
                self.level.as_str(),
                component,
                self.message
            ),
            None => format!(
                "[{}] {}: {}",
                self.timestamp,
                self.level.as_str(),
                self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_with_component() {
        let msg = LogMessage::new(
            LogLevel::Warn,
            Some("STUN".to_string()),
            "retransmitting".to_string(),
        );
        let line = msg.format_line();

        assert!(line.contains("WARN [STUN]: retransmitting"));
        assert!(!line.ends_with('\n'));
    }

    #[test]
    fn test_format_line_without_component() {
        let msg = LogMessage::new(LogLevel::Error, None, "Connection failed".to_string());
        assert!(msg.format_line().ends_with("ERROR: Connection failed"));
    }

    #[test]
    fn test_timestamp_format() {
        let msg = LogMessage::new(LogLevel::Info, None, "Test".to_string());
        let ts = &msg.timestamp;

        // YYYY-MM-DD HH:MM:SS.mmm
        assert_eq!(ts.len(), 23);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[19..20], ".");
    }
}
