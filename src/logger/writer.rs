//! Log writer module
//!
//! Process-wide log sink. Writes are serialized behind a mutex so the sink is
//! safe to share between connection tasks.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use super::format::{Level, LogEvent, LogFormat};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    File(File),
}

/// Thread-safe log writer
pub struct LogWriter {
    target: Mutex<LogTarget>,
    min_level: Level,
    format: LogFormat,
}

impl LogWriter {
    fn new(log_file: Option<&str>, min_level: Level, format: LogFormat) -> io::Result<Self> {
        let target = match log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };
        Ok(Self {
            target: Mutex::new(target),
            min_level,
            format,
        })
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Write one event if its level passes the filter
    pub fn write(&self, event: &LogEvent) {
        if !self.enabled(event.level) {
            return;
        }
        let line = event.format(self.format);
        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *target {
            LogTarget::Stdout => println!("{line}"),
            LogTarget::File(file) => {
                let _ = writeln!(file, "{line}");
            }
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if the log file cannot be opened.
pub fn init(log_file: Option<&str>, min_level: Level, format: LogFormat) -> io::Result<()> {
    let writer = LogWriter::new(log_file, min_level, format)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
