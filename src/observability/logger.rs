//! Structured JSON logger
//!
//! One log line = one engine event, synchronous, no buffering. A line is a
//! typed structure serialized with serde_json, so key order is
//! deterministic: `event`, then `severity`, then context fields
//! alphabetically. Context fields carry engine values and keep their JSON
//! type in the output: record counts log as numbers, ids and partition
//! values as their scalar rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::value::Value;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable, process exits
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Error and fatal lines route to stderr
    fn routes_to_stderr(&self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured log line.
///
/// `event` and `severity` serialize first; the flattened context map is
/// sorted by key.
#[derive(Serialize)]
struct LogLine<'a> {
    event: &'a str,
    severity: &'a str,
    #[serde(flatten)]
    fields: BTreeMap<&'a str, serde_json::Value>,
}

/// Scalar values keep their JSON type; everything else logs bare.
fn wire_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Value::from(*f),
        other => serde_json::Value::String(other.to_string()),
    }
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and context fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, Value)]) {
        if severity.routes_to_stderr() {
            Self::write_line(severity, event, fields, &mut io::stderr());
        } else {
            Self::write_line(severity, event, fields, &mut io::stdout());
        }
    }

    /// Serializes one line to the given writer
    fn write_line<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, Value)],
        writer: &mut W,
    ) {
        let line = LogLine {
            event,
            severity: severity.as_str(),
            fields: fields.iter().map(|(key, value)| (*key, wire_value(value))).collect(),
        };

        if let Ok(mut encoded) = serde_json::to_string(&line) {
            encoded.push('\n');
            let _ = writer.write_all(encoded.as_bytes());
            let _ = writer.flush();
        }
    }

    /// Log at TRACE level
    pub fn trace(event: &str, fields: &[(&str, Value)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(event: &str, fields: &[(&str, Value)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(event: &str, fields: &[(&str, Value)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(event: &str, fields: &[(&str, Value)]) {
        Self::log(Severity::Error, event, fields);
    }

    /// Log at FATAL level
    pub fn fatal(event: &str, fields: &[(&str, Value)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

/// Capture a line to a buffer for testing
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, Value)]) -> String {
    let mut buffer = Vec::new();
    Logger::write_line(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
