//! Structured application logging.
//!
//! # Responsibilities
//! - Build one [`LogRecord`] per call and render it once
//! - Fan the rendered line out to every destination whose threshold admits it
//! - Keep file and console writes off the caller's task
//!
//! # Design Decisions
//! - Line format is `[<RFC 3339 timestamp, millis, UTC>] <LEVEL>: <message>` everywhere
//! - Structured messages are serialized to compact JSON
//! - Writes go through `tracing_appender` workers: one message per line, lossy when full
//! - The logger is constructed once and shared via `Arc`; tests swap in [`MemoryDestination`]

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

use crate::config::LoggingConfig;
use crate::observability::rotation::DailyRollingFile;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message body of a log record.
#[derive(Debug, Clone, PartialEq)]
pub enum LogMessage {
    Text(String),
    /// Compact JSON text, fields in declaration order.
    Structured(String),
}

impl LogMessage {
    /// Serialize any value as a structured message.
    pub fn structured<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => match serde_json::from_str::<String>(&json) {
                Ok(s) => LogMessage::Text(s),
                Err(_) => LogMessage::Structured(json),
            },
            Err(e) => LogMessage::Text(format!("<unserializable log message: {}>", e)),
        }
    }

    pub fn render(&self) -> &str {
        match self {
            LogMessage::Text(s) | LogMessage::Structured(s) => s,
        }
    }
}

impl From<&str> for LogMessage {
    fn from(s: &str) -> Self {
        LogMessage::Text(s.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(s: String) -> Self {
        LogMessage::Text(s)
    }
}

impl From<serde_json::Value> for LogMessage {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => LogMessage::Text(s),
            other => LogMessage::Structured(other.to_string()),
        }
    }
}

impl From<ErrorPayload> for LogMessage {
    fn from(payload: ErrorPayload) -> Self {
        LogMessage::structured(&payload)
    }
}

/// Full detail of a request fault, logged server-side only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// A single leveled, timestamped log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub timestamp: DateTime<Utc>,
    pub message: LogMessage,
}

impl LogRecord {
    pub fn new(level: Level, message: LogMessage) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            message,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.message.render()
        )
    }
}

/// An output for rendered log lines.
pub trait Destination: Send + Sync {
    /// Lowest level this destination accepts.
    fn threshold(&self) -> Level;

    /// Write one rendered line (without trailing newline). Must not block or panic.
    fn write_line(&self, line: &str);

    fn admits(&self, level: Level) -> bool {
        level >= self.threshold()
    }
}

/// Destination backed by a non-blocking writer thread.
pub struct WriterDestination {
    threshold: Level,
    writer: NonBlocking,
    _guard: WorkerGuard,
}

impl WriterDestination {
    pub fn new<W>(threshold: Level, name: &str, inner: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (writer, guard) = NonBlockingBuilder::default()
            .lossy(true)
            .thread_name(name)
            .finish(inner);
        Self {
            threshold,
            writer,
            _guard: guard,
        }
    }

    pub fn console() -> Self {
        Self::new(Level::Info, "log-console", io::stdout())
    }

    pub fn rolling_file(threshold: Level, file: DailyRollingFile) -> Self {
        let name = match threshold {
            Level::Info => "log-info-file",
            Level::Error => "log-error-file",
        };
        Self::new(threshold, name, file)
    }
}

impl Destination for WriterDestination {
    fn threshold(&self) -> Level {
        self.threshold
    }

    fn write_line(&self, line: &str) {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        // Enqueue only; a full queue drops the line.
        let _ = self.writer.clone().write_all(buf.as_bytes());
    }
}

/// Destination that keeps lines in memory.
#[derive(Clone)]
pub struct MemoryDestination {
    threshold: Level,
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryDestination {
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold,
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Destination for MemoryDestination {
    fn threshold(&self) -> Level {
        self.threshold
    }

    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Process-wide application logger.
pub struct Logger {
    destinations: Vec<Box<dyn Destination>>,
}

impl Logger {
    pub fn new(destinations: Vec<Box<dyn Destination>>) -> Self {
        Self { destinations }
    }

    /// Console plus daily rotating info and error files.
    pub fn from_config(config: &LoggingConfig) -> io::Result<Self> {
        let info_file = DailyRollingFile::new(config.info_dir(), config.info_retention_days)?;
        let error_file = DailyRollingFile::new(config.error_dir(), config.error_retention_days)?;

        tracing::info!(
            info_dir = %config.info_dir().display(),
            error_dir = %config.error_dir().display(),
            info_retention_days = config.info_retention_days,
            error_retention_days = config.error_retention_days,
            "Application log files ready"
        );

        Ok(Self::new(vec![
            Box::new(WriterDestination::console()),
            Box::new(WriterDestination::rolling_file(Level::Info, info_file)),
            Box::new(WriterDestination::rolling_file(Level::Error, error_file)),
        ]))
    }

    pub fn info(&self, message: impl Into<LogMessage>) {
        self.log(LogRecord::new(Level::Info, message.into()));
    }

    pub fn error(&self, message: impl Into<LogMessage>) {
        self.log(LogRecord::new(Level::Error, message.into()));
    }

    pub fn log(&self, record: LogRecord) {
        let line = record.to_string();
        for destination in &self.destinations {
            if destination.admits(record.level) {
                destination.write_line(&line);
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("destinations", &self.destinations.len())
            .finish()
    }
}
