//! Host `tracing` events reaching the correlator

use probe_engine::{CommandRunner, LogLevel, RunnerConfig};
use probe_runtime::{Document, LogCapture, install_demo_host};
use tracing_subscriber::layer::SubscriberExt;

fn runner() -> CommandRunner {
    let document = Document::sample();
    let mut runner = CommandRunner::new(RunnerConfig::default());
    install_demo_host(&mut runner, &document);
    runner
}

#[tokio::test(start_paused = true)]
async fn late_host_error_is_attributed() {
    let runner = runner();
    let subscriber =
        tracing_subscriber::registry().with(LogCapture::new(runner.log_queue().clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let result = runner
        .run("document.failLater(5, 'Warning: state update on unmounted component')")
        .await;
    assert_eq!(result.error_kind(), Some("AsyncConsoleError"));
    assert_eq!(result.statement_index, Some(0));
    assert_eq!(result.log_events.len(), 1);
    assert_eq!(result.log_events[0].level, LogLevel::Error);

    assert!(runner.run("refresh()").await.ok);
}

#[tokio::test(start_paused = true)]
async fn error_after_settle_surfaces_on_next_run() {
    let runner = runner();
    let subscriber =
        tracing_subscriber::registry().with(LogCapture::new(runner.log_queue().clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let first = runner.run("document.failLater(50, 'too late')").await;
    assert!(first.ok);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let second = runner.run("refresh()").await;
    assert_eq!(second.error_kind(), Some("AsyncConsoleError"));
    assert!(second.error_message().unwrap().ends_with("too late"));
}
