//! Log event format module
//!
//! One event per line, in either format:
//! - `logfmt`: `ts=2026-01-01T00:00:00.000Z level=INFO event=http_request method=GET path=/`
//! - `json`: the same data as a JSON object

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Event severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Output line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Logfmt,
    Json,
}

/// A single structured log event
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub event: &'static str,
    /// Details in insertion order
    pub fields: Vec<(&'static str, String)>,
}

impl LogEvent {
    /// Create an event stamped with the current time
    pub fn new(level: Level, event: &'static str) -> Self {
        Self {
            time: Utc::now(),
            level,
            event,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn format(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Logfmt => self.format_logfmt(),
            LogFormat::Json => self.format_json(),
        }
    }

    fn timestamp(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn format_logfmt(&self) -> String {
        let mut line = format!(
            "ts={} level={} event={}",
            self.timestamp(),
            self.level,
            self.event
        );
        for (key, value) in &self.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(&logfmt_value(value));
        }
        line
    }

    fn format_json(&self) -> String {
        let mut obj = Map::new();
        obj.insert("ts".to_string(), Value::from(self.timestamp()));
        obj.insert("level".to_string(), Value::from(self.level.as_str()));
        obj.insert("event".to_string(), Value::from(self.event));
        for (key, value) in &self.fields {
            obj.insert((*key).to_string(), Value::from(value.as_str()));
        }
        Value::Object(obj).to_string()
    }
}

/// Keep each event on one line; quote values that would break key=value splitting
fn logfmt_value(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.is_empty() || flat.contains([' ', '=', '"']) {
        format!("\"{}\"", flat.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        flat
    }
}
