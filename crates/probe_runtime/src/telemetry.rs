//! Process-wide tracing setup for the `probe` binary.

use probe_engine::LogQueue;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::capture::LogCapture;

/// Installs the global subscriber.
///
/// Diagnostics go to stderr, filtered by `RUST_LOG` or else `level`. When a
/// queue is given, host events are also captured into it regardless of the
/// filter, so async errors are correlated even when logging is quiet.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(queue: Option<LogQueue>, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter),
        )
        .with(queue.map(LogCapture::new))
        .try_init()
        .ok();
}
