//! Error types for the Probe system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every error carries an [`ErrorKind`] whose [`ErrorKind::name`] is the
//! stable kind string reported to hosts (`"UnknownIdentifierError"`, ...).

use std::fmt;

use thiserror::Error;

/// The main error type for Probe operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Adds context only if none has been attached yet.
    ///
    /// Inner nodes attach their position first; outer nodes must not
    /// overwrite it.
    #[must_use]
    pub fn or_context(mut self, context: ErrorContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    /// Creates an unknown identifier error.
    #[must_use]
    pub fn unknown_identifier(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownIdentifier(name.into()))
    }

    /// Creates an unknown property error.
    #[must_use]
    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownProperty(name.into()))
    }

    /// Creates an index out of range error.
    #[must_use]
    pub fn index_out_of_range(index: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndexOutOfRange {
            index: index.into(),
            target: target.into(),
        })
    }

    /// Creates a syntax error for a node the evaluator does not accept.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax(message.into()))
    }

    /// Creates a not-callable error.
    #[must_use]
    pub fn not_callable(callee: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotCallable(callee.into()))
    }

    /// Creates an error raised by a host capability.
    ///
    /// `kind` is reported verbatim to the caller, e.g. `"AssertionError"`.
    #[must_use]
    pub fn host(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Host {
            kind: kind.into(),
            message: message.into(),
        })
    }

    /// Creates an error for a log event surfaced after evaluation.
    #[must_use]
    pub fn async_console(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AsyncConsole(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns the stable kind string of this error.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        self.kind.name()
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed command text or a construct outside the supported subset.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// Name is neither a registered capability nor a local variable.
    #[error("\"{0}\" is not valid")]
    UnknownIdentifier(String),

    /// Static member lookup found nothing.
    #[error("\"{0}\" is not a valid property")]
    UnknownProperty(String),

    /// Computed (indexed) member lookup found nothing.
    #[error("index {index} is out of range for {target}")]
    IndexOutOfRange {
        /// The index or key that was attempted, as written.
        index: String,
        /// Description of the indexed value.
        target: String,
    },

    /// A node the evaluator does not accept in this position.
    #[error("{0}")]
    Syntax(String),

    /// The callee of a call expression is not callable.
    #[error("\"{0}\" is not a function")]
    NotCallable(String),

    /// An error-level log event that surfaced after the statements ran.
    #[error(
        "Error printed to console.error. This error occurred asynchronously, \
         and may have happened before this line was executed.\n\n{0}"
    )]
    AsyncConsole(String),

    /// Failure raised by a host capability.
    #[error("{message}")]
    Host {
        /// Kind string chosen by the host.
        kind: String,
        /// Human-readable message.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the kind string reported to hosts.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ParseError { .. } => "ParseError",
            Self::UnknownIdentifier(_) => "UnknownIdentifierError",
            Self::UnknownProperty(_) => "UnknownPropertyError",
            Self::IndexOutOfRange { .. } => "IndexOutOfRangeError",
            Self::Syntax(_) => "SyntaxError",
            Self::NotCallable(_) => "TypeError",
            Self::AsyncConsole(_) => "AsyncConsoleError",
            Self::Host { kind, .. } => kind,
            Self::Internal(_) => "InternalError",
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Line number in the command text (1-indexed).
    pub line: Option<u32>,
    /// Column number in the command text (1-indexed).
    pub column: Option<u32>,
    /// Source text of the failing node.
    pub source: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Sets the source text.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "at {line}:{col}")?;
        }
        if let Some(source) = &self.source {
            write!(f, " in `{source}`")?;
        }
        Ok(())
    }
}
