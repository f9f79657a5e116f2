//! Log sinks: where formatted records end up.

use crate::error::{LoggingError, Result};
use crate::log_message::LogMessage;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

/// Destination shared by every clone of a [`crate::Logger`].
#[derive(Clone)]
pub(crate) enum Sink {
    /// Records are handed to a dedicated writer thread that appends to a file.
    File(Sender<LogMessage>),
    /// Records are printed to stdout on the caller's thread.
    Console,
    /// Records are kept in memory; nothing leaves the process.
    Memory(Arc<Mutex<Vec<String>>>),
}

impl Sink {
    /// Opens `log_path` in append mode and spawns the writer thread that owns it.
    pub fn file(log_path: &Path) -> Result<Self> {
        let writer = FileWriter::new(log_path)?;
        let (sender, receiver) = channel();
        std::thread::spawn(move || writer.run(receiver));
        Ok(Sink::File(sender))
    }

    pub fn memory() -> Self {
        Sink::Memory(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn write(&self, message: LogMessage) {
        match self {
            // A closed channel means the writer thread died; the record is dropped.
            Sink::File(sender) => {
                let _ = sender.send(message);
            }
            Sink::Console => println!("{}", message.format_line()),
            Sink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(message.format_line());
                }
            }
        }
    }

    /// Returns the captured lines of a memory sink, or an empty list for other sinks.
    pub fn captured(&self) -> Result<Vec<String>> {
        match self {
            Sink::Memory(lines) => lines
                .lock()
                .map(|lines| lines.clone())
                .map_err(|_| LoggingError::Poisoned),
            _ => Ok(Vec::new()),
        }
    }
}

/// Owns the log file inside the writer thread.
struct FileWriter {
    file: File,
}

impl FileWriter {
    fn new(log_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self { file })
    }

    fn write_message(&mut self, message: &LogMessage) {
        let line = format!("{}\n", message.format_line());
        if let Err(e) = self.file.write_all(line.as_bytes()) {
            eprintln!("Error writing log: {}", e);
            return;
        }
        if let Err(e) = self.file.flush() {
            eprintln!("Error flushing log: {}", e);
        }
    }

    /// Runs until every sender is dropped.
    fn run(mut self, receiver: Receiver<LogMessage>) {
        for message in receiver {
            self.write_message(&message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_level::LogLevel;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_creates_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("stun.log");

        let sink = Sink::file(&log_path);
        assert!(sink.is_ok());
        assert!(log_path.exists());
    }

    #[test]
    fn test_file_sink_writes_through_thread() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("stun.log");

        let sink = Sink::file(&log_path).unwrap();
        sink.write(LogMessage::new(
            LogLevel::Debug,
            None,
            "Thread test".to_string(),
        ));
        drop(sink);

        thread::sleep(Duration::from_millis(100));

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Thread test"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_memory_sink_is_shared_between_clones() {
        let sink = Sink::memory();
        let clone = sink.clone();

        clone.write(LogMessage::new(LogLevel::Info, None, "one".to_string()));
        sink.write(LogMessage::new(LogLevel::Info, None, "two".to_string()));

        let lines = sink.captured().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("one"));
        assert!(lines[1].ends_with("two"));
    }

    #[test]
    fn test_console_sink_captures_nothing() {
        assert!(Sink::Console.captured().unwrap().is_empty());
    }
}
