//! Rolling event log for operator-visible activity
//!
//! Every action the operator takes and every event the signaling client
//! delivers produces a human-readable entry here. The log is bounded to the
//! most recent [`EventLog::CAPACITY`] entries so the console can render it
//! unconditionally; older entries are evicted oldest-first.
//!
//! Appending is synchronous and infallible. The log is shared between the
//! session controller (writer) and the console (reader) behind an internal
//! mutex, so both sides hold a plain `EventLog` handle.
//!
//! # Examples
//!
//! ```rust
//! use softphone_console::log::{EventLog, Severity};
//!
//! let log = EventLog::new();
//! log.append("REGISTER sent", Severity::Info);
//! log.append("registration accepted", Severity::Success);
//!
//! let entries = log.entries();
//! assert_eq!(entries.len(), 2);
//! assert_eq!(entries[1].severity, Severity::Success);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Display classification of a log entry
///
/// Used only for styling in the console; it carries no control-flow meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine activity (requests sent, neutral events)
    Info,
    /// A failed action or an error-bearing event
    Error,
    /// A confirmation event (connected, registered, call answered)
    Success,
}

/// One timestamped line of the rolling log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was appended, local clock
    pub timestamp: DateTime<Local>,
    /// Human-readable message
    pub message: String,
    /// Display severity
    pub severity: Severity,
}

impl LogEntry {
    /// Timestamp formatted for display (`HH:MM:SS`)
    pub fn time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Bounded, append-only log of the most recent activity
///
/// Cheaply cloneable; all clones share the same underlying entries.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl EventLog {
    /// Maximum number of retained entries
    pub const CAPACITY: usize = 50;

    /// Create an empty log
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(Self::CAPACITY))),
        }
    }

    /// Append an entry, evicting the oldest once the capacity is exceeded
    pub fn append(&self, message: impl Into<String>, severity: Severity) {
        let entry = LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            severity,
        };
        let mut entries = self.entries.lock();
        if entries.len() == Self::CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Shorthand for a [`Severity::Info`] entry
    pub fn info(&self, message: impl Into<String>) {
        self.append(message, Severity::Info);
    }

    /// Shorthand for a [`Severity::Error`] entry
    pub fn error(&self, message: impl Into<String>) {
        self.append(message, Severity::Error);
    }

    /// Shorthand for a [`Severity::Success`] entry
    pub fn success(&self, message: impl Into<String>) {
        self.append(message, Severity::Success);
    }

    /// Snapshot of the current entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no entries have been appended yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
