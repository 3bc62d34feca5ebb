//! Diagnostic correlation tests

use std::time::Duration;

use probe_engine::{CommandRunner, Correlator, LogQueue, RunnerConfig};

#[test]
fn correlator_claims_each_error_once() {
    let queue = LogQueue::new();
    queue.warn("only a warning");
    queue.error("first");
    queue.error("second");

    let correlator = Correlator::new(queue.clone());
    let first = correlator.correlate().unwrap();
    assert!(first.to_string().ends_with("first"));
    let second = correlator.correlate().unwrap();
    assert!(second.to_string().ends_with("second"));
    assert!(correlator.correlate().is_none());
    assert_eq!(queue.len(), 3);
}

#[test]
fn cleared_queue_has_nothing_to_claim() {
    let queue = LogQueue::new();
    queue.error("gone");
    queue.clear();
    assert!(Correlator::new(queue).correlate().is_none());
}

#[tokio::test]
async fn async_error_is_reported_by_exactly_one_run() {
    let runner = CommandRunner::new(RunnerConfig::default().with_settle_delay(Duration::ZERO));
    runner.log_queue().error("\u{1b}[31mWarning: update not wrapped\u{1b}[39m");

    let first = runner.run("console.log('x')").await;
    assert_eq!(first.error_kind(), Some("AsyncConsoleError"));
    assert!(
        first
            .error_message()
            .unwrap()
            .ends_with("\n\nWarning: update not wrapped")
    );
    assert_eq!(first.statement_index, Some(0));

    for _ in 0..3 {
        assert!(runner.run("console.log('y')").await.ok);
    }
}

#[tokio::test]
async fn statement_failure_takes_priority_over_async_error() {
    let runner = CommandRunner::new(RunnerConfig::default().with_settle_delay(Duration::ZERO));
    runner.log_queue().error("pending");

    let failed = runner.run("missing").await;
    assert_eq!(failed.error_kind(), Some("UnknownIdentifierError"));

    // The pending error is still unclaimed and surfaces on the next clean run.
    let next = runner.run("refresh()").await;
    assert_eq!(next.error_kind(), Some("AsyncConsoleError"));
    assert_eq!(next.value, None);
}
