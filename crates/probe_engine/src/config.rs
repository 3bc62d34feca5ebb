//! Configuration for the command runner.

use std::time::Duration;

/// Default wait after the last statement before looking for async errors.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Default number of log events retained by a runner's queue.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Environment variable overriding [`RunnerConfig::settle_delay`], in
/// milliseconds.
pub const SETTLE_ENV_VAR: &str = "PROBE_SETTLE_MS";

/// Configuration for a [`CommandRunner`](crate::CommandRunner).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    /// How long to wait after the last statement so that asynchronously
    /// printed errors can reach the log queue.
    pub settle_delay: Duration,

    /// Maximum number of log events kept in the queue; the oldest are
    /// dropped first.
    pub log_capacity: usize,

    /// Register `console` and `refresh` when the runner is created.
    pub builtins: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            builtins: true,
        }
    }
}

impl RunnerConfig {
    /// Creates the default configuration with environment overrides
    /// applied.
    ///
    /// An unparsable `PROBE_SETTLE_MS` is logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(SETTLE_ENV_VAR) {
            Ok(raw) => match parse_millis(&raw) {
                Some(delay) => config.with_settle_delay(delay),
                None => {
                    tracing::warn!(value = %raw, "ignoring invalid {SETTLE_ENV_VAR}");
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Builder method to set the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Builder method to set the log queue capacity.
    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }

    /// Builder method to enable or disable the built-in capabilities.
    #[must_use]
    pub fn with_builtins(mut self, builtins: bool) -> Self {
        self.builtins = builtins;
        self
    }
}

/// Parses a millisecond count such as `"25"`.
#[must_use]
pub fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}
