//! Demo host, log capture, REPL, and CLI for Probe.
//!
//! This crate provides:
//! - [`Document`] - An in-memory snapshot source with `screen`-style queries
//! - [`expect`] - Assertion matchers as a capability
//! - [`LogCapture`] - Routes host `tracing` events into the log queue
//! - [`Repl`] - Interactive console over a [`CommandRunner`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assertions;
pub mod capture;
pub mod document;
pub mod editor;
pub mod repl;
pub mod telemetry;

pub use assertions::{ASSERTION_ERROR, expect};
pub use capture::LogCapture;
pub use document::{Document, ElementId, QUERY_ERROR, TextMatch};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, format_result};
pub use telemetry::init_tracing;

use probe_engine::CommandRunner;

/// Registers the document capabilities and `expect` on `runner`.
pub fn install_demo_host(runner: &mut CommandRunner, document: &Document) {
    runner.register(document.capabilities());
    runner.register([("expect", expect())]);
}
