//! Command runner, log correlation, and result records for Probe.
//!
//! This crate provides:
//! - [`CommandRunner`] - Parses and runs commands, one statement at a time
//! - [`LogQueue`] - Console events shared between hosts and the runner
//! - [`Correlator`] - At-most-once attribution of asynchronous errors
//! - [`RunResult`] - The serializable record every run produces
//! - [`Session`] - Variables that persist across runs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builtins;
pub mod config;
pub mod correlator;
pub mod log;
pub mod result;
pub mod runner;
pub mod sanitize;
pub mod session;

pub use config::{DEFAULT_SETTLE_DELAY, RunnerConfig, SETTLE_ENV_VAR};
pub use correlator::Correlator;
pub use log::{LogEvent, LogLevel, LogQueue, LogRecord};
pub use result::{ErrorInfo, RunResult};
pub use runner::{CommandRunner, RunState};
pub use sanitize::strip_escapes;
pub use session::Session;
