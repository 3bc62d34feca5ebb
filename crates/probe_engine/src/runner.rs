//! The command runner: parse, execute statements in order, settle,
//! correlate, report.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use probe_foundation::{Error, Value};
use probe_language::{CapabilityRegistry, Evaluator, Node, Scope, parse};
use tracing::Instrument;

use crate::builtins::builtins;
use crate::config::RunnerConfig;
use crate::correlator::Correlator;
use crate::log::LogQueue;
use crate::result::RunResult;
use crate::session::Session;

// =============================================================================
// Run State
// =============================================================================

/// Where a run is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Idle,
    /// Parsing the command text.
    Parsing,
    /// Executing the statement at this index.
    Running(usize),
    /// Waiting for asynchronous errors to reach the log queue.
    Settling,
    /// Finished; the result is final.
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Parsing => write!(f, "parsing"),
            Self::Running(index) => write!(f, "running statement {index}"),
            Self::Settling => write!(f, "settling"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Runs commands against registered capabilities.
///
/// Runs must be awaited inside a tokio runtime with the time driver enabled
/// (the settle delay sleeps).
#[derive(Debug)]
pub struct CommandRunner {
    registry: CapabilityRegistry,
    queue: LogQueue,
    config: RunnerConfig,
    next_run: AtomicU64,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl CommandRunner {
    /// Creates a runner with its own log queue.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        let queue = LogQueue::with_capacity(config.log_capacity);
        Self::with_log_queue(config, queue)
    }

    /// Creates a runner that reads (and lets `console` write) `queue`.
    #[must_use]
    pub fn with_log_queue(config: RunnerConfig, queue: LogQueue) -> Self {
        let mut registry = CapabilityRegistry::new();
        if config.builtins {
            registry.register(builtins(&queue));
        }
        Self {
            registry,
            queue,
            config,
            next_run: AtomicU64::new(0),
        }
    }

    /// Merges capabilities into the registry. Later writes win.
    ///
    /// Runs already in progress keep the registry they started with.
    pub fn register<I, K>(&mut self, capabilities: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.registry.register(capabilities);
    }

    /// The capability registry.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Every registered name with its member names.
    #[must_use]
    pub fn list_members(&self) -> BTreeMap<String, Vec<String>> {
        self.registry.list_members()
    }

    /// The log queue hosts append console events to.
    #[must_use]
    pub fn log_queue(&self) -> &LogQueue {
        &self.queue
    }

    /// The runner configuration.
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs a command with a fresh scope.
    ///
    /// Never fails: every failure is reported in the returned record.
    pub async fn run(&self, source: &str) -> RunResult {
        let mut scope = Scope::new();
        self.run_with_scope(source, &mut scope).await
    }

    /// Runs a command with the session's scope, so declarations persist.
    pub async fn run_in_session(&self, source: &str, session: &mut Session) -> RunResult {
        let result = self.run_with_scope(source, session.scope_mut()).await;
        session.record_run(result.value.clone());
        result
    }

    async fn run_with_scope(&self, source: &str, scope: &mut Scope) -> RunResult {
        let run = self.next_run.fetch_add(1, Ordering::Relaxed);
        let span = tracing::debug_span!("run", run);
        self.execute(source, scope).instrument(span).await
    }

    async fn execute(&self, source: &str, scope: &mut Scope) -> RunResult {
        let watermark = self.queue.watermark();
        let mut state = RunState::Idle;

        transition(&mut state, RunState::Parsing);
        let program = match parse(source) {
            Ok(program) => program,
            Err(error) => {
                return self.complete(&mut state, Err((error, None)), watermark);
            }
        };

        // Capabilities registered during this run are not visible to it.
        let evaluator = Evaluator::new(self.registry.clone());
        let statements = program.body().unwrap_or_default();
        let mut last = Value::Undefined;

        for (index, statement) in statements.iter().enumerate() {
            transition(&mut state, RunState::Running(index));
            match execute_guarded(&evaluator, statement, scope).await {
                Ok(value) => last = value,
                Err(error) => {
                    let error = attach_source(error, statement, source);
                    return self.complete(&mut state, Err((error, Some(index))), watermark);
                }
            }
        }

        transition(&mut state, RunState::Settling);
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let last_index = statements.len().saturating_sub(1);
        let outcome = match Correlator::new(self.queue.clone()).correlate() {
            Some(error) => Err((error, Some(last_index))),
            None => Ok(last),
        };
        self.complete(&mut state, outcome, watermark)
    }

    fn complete(
        &self,
        state: &mut RunState,
        outcome: Result<Value, (Error, Option<usize>)>,
        watermark: u64,
    ) -> RunResult {
        transition(state, RunState::Completed);
        let log_events = self.queue.records_since(watermark);
        match outcome {
            Ok(value) => {
                tracing::info!(events = log_events.len(), "run succeeded");
                RunResult::success(value, log_events)
            }
            Err((error, statement_index)) => {
                tracing::info!(
                    kind = error.kind_name(),
                    statement_index = ?statement_index,
                    error = %error,
                    "run failed"
                );
                RunResult::failure(&error, statement_index, log_events)
            }
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    tracing::debug!(from = %state, to = %next, "run state");
    *state = next;
}

/// Executes one statement, converting a panic into an internal error.
async fn execute_guarded(
    evaluator: &Evaluator,
    statement: &Node,
    scope: &mut Scope,
) -> probe_foundation::Result<Value> {
    match AssertUnwindSafe(evaluator.execute(statement, scope))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(Error::internal(format!(
            "statement panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn attach_source(mut error: Error, statement: &Node, source: &str) -> Error {
    let context = error
        .context
        .take()
        .unwrap_or_default()
        .with_source(statement.span().text(source));
    error.with_context(context)
}
