// In-memory log capture for the TUI
//
// A custom tracing layer stores log events in a bounded ring buffer instead
// of writing them to stdout, where they would break through the alternate
// screen buffer and garble the display. The TUI reads the buffer each frame.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

const MAX_LOG_ENTRIES: usize = 500;

/// A single log event captured from tracing
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Trace,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// Bounded in-memory log buffer, cloneable across tasks
#[derive(Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn add(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() >= MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// All entries, oldest first
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }

    /// Most recent warning-or-worse entry, for the status line
    pub fn latest_problem(&self) -> Option<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| matches!(e.level, LogLevel::Error | LogLevel::Warn))
            .cloned()
    }
}

/// Tracing layer that captures events into a LogBuffer
pub struct TuiLogLayer {
    buffer: LogBuffer,
}

impl TuiLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = LogLevel::from(metadata.level());

        let mut message = String::new();
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        self.buffer.add(LogEntry {
            timestamp: Local::now(),
            level,
            message,
        });
    }

    fn enabled(&self, _metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        // Filtering happens at the subscriber level
        true
    }
}

/// Extracts the `message` field from a tracing event
struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
            // Strip the quotes Debug adds around strings
            if self.0.starts_with('"') && self.0.ends_with('"') {
                *self.0 = self.0[1..self.0.len() - 1].to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_buffer_evicts_oldest_when_full() {
        let buffer = LogBuffer::new();
        for i in 0..(MAX_LOG_ENTRIES + 10) {
            buffer.add(entry(LogLevel::Info, &format!("line {}", i)));
        }
        let all = buffer.get_all();
        assert_eq!(all.len(), MAX_LOG_ENTRIES);
        assert_eq!(all[0].message, "line 10");
    }

    #[test]
    fn test_latest_problem_skips_info() {
        let buffer = LogBuffer::new();
        buffer.add(entry(LogLevel::Warn, "old warning"));
        buffer.add(entry(LogLevel::Info, "routine"));
        let latest = buffer.latest_problem().unwrap();
        assert_eq!(latest.message, "old warning");
    }
}
