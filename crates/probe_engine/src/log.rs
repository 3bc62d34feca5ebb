//! The shared log queue.
//!
//! Hosts append console-style events (`log`, `warn`, `error`) as they
//! happen; the runner reads the events appended during a run and the
//! correlator claims unseen errors.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_LOG_CAPACITY;

// =============================================================================
// Events
// =============================================================================

/// Severity of a log event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// `console.log`
    Log,
    /// `console.warn`
    Warn,
    /// `console.error`
    Error,
}

impl LogLevel {
    /// The level name as printed.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event in the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    /// Monotonic id, unique for the lifetime of the queue.
    pub id: u64,
    /// Severity.
    pub level: LogLevel,
    /// First argument of the console call, rendered as text.
    pub message: String,
    seen: bool,
}

impl LogEvent {
    /// Returns true once the correlator has attributed this event to a run.
    #[must_use]
    pub const fn is_seen(&self) -> bool {
        self.seen
    }

    /// The serializable part of this event.
    #[must_use]
    pub fn record(&self) -> LogRecord {
        LogRecord {
            level: self.level,
            message: self.message.clone(),
        }
    }
}

/// `{level, message}` as reported in a run result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
}

// =============================================================================
// Queue
// =============================================================================

#[derive(Debug)]
struct Buffer {
    events: VecDeque<LogEvent>,
    capacity: usize,
    next_id: u64,
}

/// Shared, append-only log queue.
///
/// Cloning yields another handle to the same queue. When full, the oldest
/// events are discarded.
#[derive(Clone, Debug)]
pub struct LogQueue {
    inner: Arc<Mutex<Buffer>>,
}

impl Default for LogQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LogQueue {
    /// Creates a queue with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Creates a queue holding at most `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buffer {
                events: VecDeque::with_capacity(capacity.min(1024)),
                capacity: capacity.max(1),
                next_id: 0,
            })),
        }
    }

    /// Appends an event and returns its id.
    pub fn push(&self, level: LogLevel, message: impl Into<String>) -> u64 {
        let mut buffer = self.inner.lock();
        let id = buffer.next_id;
        buffer.next_id += 1;
        buffer.events.push_back(LogEvent {
            id,
            level,
            message: message.into(),
            seen: false,
        });
        while buffer.events.len() > buffer.capacity {
            buffer.events.pop_front();
        }
        id
    }

    /// Appends a `log` event.
    pub fn log(&self, message: impl Into<String>) -> u64 {
        self.push(LogLevel::Log, message)
    }

    /// Appends a `warn` event.
    pub fn warn(&self, message: impl Into<String>) -> u64 {
        self.push(LogLevel::Warn, message)
    }

    /// Appends an `error` event.
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(LogLevel::Error, message)
    }

    /// The id the next appended event will receive.
    #[must_use]
    pub fn watermark(&self) -> u64 {
        self.inner.lock().next_id
    }

    /// Events appended at or after `watermark`, oldest first.
    #[must_use]
    pub fn records_since(&self, watermark: u64) -> Vec<LogRecord> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|event| event.id >= watermark)
            .map(LogEvent::record)
            .collect()
    }

    /// A copy of every retained event, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.inner.lock().events.iter().cloned().collect()
    }

    /// Number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Returns true if no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Discards every event. Ids keep increasing.
    pub fn clear(&self) {
        self.inner.lock().events.clear();
    }

    /// Marks the first unseen error as seen and returns it.
    ///
    /// Only the correlator calls this, so each error is claimed at most
    /// once.
    pub(crate) fn claim_unseen_error(&self) -> Option<LogEvent> {
        let mut buffer = self.inner.lock();
        let event = buffer
            .events
            .iter_mut()
            .find(|event| event.level == LogLevel::Error && !event.seen)?;
        event.seen = true;
        Some(event.clone())
    }
}
