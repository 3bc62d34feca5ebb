//! The record every run produces.

use std::fmt;

use probe_foundation::{Error, ErrorKind, Value};
use serde::{Deserialize, Serialize};

use crate::log::LogRecord;
use crate::sanitize::strip_escapes;

/// Outcome of one run.
///
/// Serializes as `{ok, error, statementIndex, logEvents}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// True if every statement succeeded and no asynchronous error was
    /// attributed to the run.
    pub ok: bool,
    /// The failure, if any.
    pub error: Option<ErrorInfo>,
    /// Index of the failing statement. `None` on success and for parse
    /// errors.
    pub statement_index: Option<usize>,
    /// Log events appended while the run was in progress.
    pub log_events: Vec<LogRecord>,
    /// Value of the last statement of a successful run.
    #[serde(skip)]
    pub value: Option<Value>,
}

impl RunResult {
    /// A successful run.
    #[must_use]
    pub fn success(value: Value, log_events: Vec<LogRecord>) -> Self {
        Self {
            ok: true,
            error: None,
            statement_index: None,
            log_events,
            value: Some(value),
        }
    }

    /// A failed run.
    #[must_use]
    pub fn failure(
        error: &Error,
        statement_index: Option<usize>,
        log_events: Vec<LogRecord>,
    ) -> Self {
        Self {
            ok: false,
            error: Some(ErrorInfo::from(error)),
            statement_index,
            log_events,
            value: None,
        }
    }

    /// The failure's kind name, if the run failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.kind.as_str())
    }

    /// The failure's message, if the run failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Serializes the result as compact JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A failure as reported to hosts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable kind name, e.g. `UnknownIdentifierError`.
    pub kind: String,
    /// Human-readable message with terminal escapes removed.
    pub message: String,
    /// 1-based line in the command text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<u32>,
    /// 1-based column in the command text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column: Option<u32>,
}

impl From<&Error> for ErrorInfo {
    fn from(error: &Error) -> Self {
        let (message, line, column) = match &error.kind {
            ErrorKind::ParseError {
                message,
                line,
                column,
                ..
            } => (message.clone(), Some(*line), Some(*column)),
            kind => {
                let context = error.context.as_ref();
                (
                    kind.to_string(),
                    context.and_then(|c| c.line),
                    context.and_then(|c| c.column),
                )
            }
        };
        Self {
            kind: error.kind_name().to_string(),
            message: strip_escapes(&message).into_owned(),
            line,
            column,
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " (at {line}:{column})")?;
        }
        Ok(())
    }
}
