//! Routes host `tracing` events into a [`LogQueue`].
//!
//! This is the log-interception producer: application code that reports
//! problems through `tracing` (including from timers that fire after a
//! statement has returned) ends up in the queue the correlator reads.

use std::fmt::{self, Write as _};

use probe_engine::{LogLevel, LogQueue};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Target prefix of Probe's own diagnostics, which are never captured.
const OWN_TARGET: &str = "probe";

/// A `tracing_subscriber` layer that appends host events to a log queue.
///
/// `ERROR`, `WARN` and `INFO` become `error`, `warn` and `log` events.
/// Lower levels and events from Probe's own crates are ignored.
#[derive(Clone, Debug)]
pub struct LogCapture {
    queue: LogQueue,
}

impl LogCapture {
    /// Creates a layer writing to `queue`.
    #[must_use]
    pub fn new(queue: LogQueue) -> Self {
        Self { queue }
    }
}

fn level_of(level: &Level) -> Option<LogLevel> {
    if *level == Level::ERROR {
        Some(LogLevel::Error)
    } else if *level == Level::WARN {
        Some(LogLevel::Warn)
    } else if *level == Level::INFO {
        Some(LogLevel::Log)
    } else {
        None
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(OWN_TARGET) {
            return;
        }
        let Some(level) = level_of(metadata.level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.queue.push(level, visitor.finish());
    }
}

/// Collects the `message` field, then any other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={value}", field.name());
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }
}
