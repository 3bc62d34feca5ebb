//! Command runner integration tests

use std::time::Duration;

use probe_engine::{CommandRunner, LogLevel, RunnerConfig, Session};
use probe_foundation::{HostObject, Value, arg};

fn runner() -> CommandRunner {
    let mut runner = CommandRunner::new(RunnerConfig::default().with_settle_delay(Duration::ZERO));
    let obj = HostObject::new("Thing")
        .with("name", "thing")
        .with_fn("echo", |args| Ok(arg(&args, 0)));
    runner.register([
        ("obj", Value::object(obj)),
        ("list", Value::list([1, 2, 3].map(Value::from))),
    ]);
    runner
}

// =============================================================================
// Outcomes
// =============================================================================

#[tokio::test]
async fn all_resolvable_command_succeeds() {
    let result = runner().run("obj; obj.name; obj.echo(list[2])").await;
    assert!(result.ok);
    assert!(result.error.is_none());
    assert!(result.statement_index.is_none());
    assert_eq!(result.value, Some(Value::from(3)));
}

#[tokio::test]
async fn unknown_identifier_reports_index_zero() {
    let result = runner().run("unknown();").await;
    assert_eq!(result.error_kind(), Some("UnknownIdentifierError"));
    assert_eq!(result.error_message(), Some("\"unknown\" is not valid"));
    assert_eq!(result.statement_index, Some(0));
}

#[tokio::test]
async fn second_line_failure_reports_index_one() {
    let result = runner().run("const a = 1;\nunknown();").await;
    assert_eq!(result.statement_index, Some(1));
    let error = result.error.unwrap();
    assert_eq!((error.line, error.column), (Some(2), Some(1)));
}

#[tokio::test]
async fn missing_property_and_out_of_range_index() {
    let runner = runner();
    assert_eq!(
        runner.run("obj.missing").await.error_kind(),
        Some("UnknownPropertyError")
    );
    assert_eq!(
        runner.run("list[10]").await.error_kind(),
        Some("IndexOutOfRangeError")
    );
}

#[tokio::test]
async fn arguments_are_evaluated_before_callee_is_checked() {
    let runner = runner();
    let result = runner.run("list(unknown)").await;
    assert_eq!(result.error_kind(), Some("UnknownIdentifierError"));
    assert_eq!(result.error_message(), Some("\"unknown\" is not valid"));

    let result = runner.run("list(console.log('side effect'))").await;
    assert_eq!(result.error_kind(), Some("TypeError"));
    assert_eq!(result.error_message(), Some("\"list\" is not a function"));
    assert_eq!(result.log_events.len(), 1);
    assert_eq!(result.log_events[0].message, "side effect");
}

#[tokio::test]
async fn deeply_nested_command_is_a_parse_error() {
    let source = format!("{}list{}", "(".repeat(10_000), ")".repeat(10_000));
    let result = runner().run(&source).await;
    assert_eq!(result.error_kind(), Some("ParseError"));
    assert_eq!(result.error_message(), Some("expression nested too deeply"));
    assert_eq!(result.statement_index, None);
}

#[tokio::test]
async fn numeric_string_key_indexes_list() {
    let runner = runner();
    assert_eq!(runner.run("list['0']").await.value, Some(Value::from(1)));
    assert_eq!(
        runner.run("list['01']").await.error_kind(),
        Some("IndexOutOfRangeError")
    );
}

#[tokio::test]
async fn capability_wins_over_local() {
    let mut runner = runner();
    runner.register([("screen", Value::from("the screen"))]);
    let result = runner.run("const screen = 5; screen").await;
    assert_eq!(result.value, Some(Value::from("the screen")));
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn later_registration_wins() {
    let mut runner = runner();
    runner.register([("obj", Value::from(1))]);
    assert_eq!(runner.run("obj").await.value, Some(Value::from(1)));
}

#[test]
fn list_members_covers_builtins() {
    let members = runner().list_members();
    assert_eq!(members["console"], vec!["error", "log", "warn"]);
    assert_eq!(members["obj"], vec!["echo", "name"]);
    assert!(members["refresh"].is_empty());
}

#[test]
fn builtins_can_be_disabled() {
    let runner = CommandRunner::new(RunnerConfig::default().with_builtins(false));
    assert!(runner.list_members().is_empty());
}

// =============================================================================
// Log Events
// =============================================================================

#[tokio::test]
async fn console_calls_are_collected_in_order() {
    let result = runner()
        .run("console.log('one', 2); console.warn(obj.name)")
        .await;
    assert!(result.ok);
    let events: Vec<_> = result
        .log_events
        .iter()
        .map(|e| (e.level, e.message.as_str()))
        .collect();
    assert_eq!(events, vec![(LogLevel::Log, "one 2"), (LogLevel::Warn, "thing")]);
}

#[tokio::test]
async fn events_from_earlier_runs_are_not_repeated() {
    let runner = runner();
    runner.run("console.log('first')").await;
    let result = runner.run("console.log('second')").await;
    assert_eq!(result.log_events.len(), 1);
    assert_eq!(result.log_events[0].message, "second");
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn bindings_before_failure_survive_in_session() {
    let runner = runner();
    let mut session = Session::new();
    let failed = runner
        .run_in_session("const kept = obj.name; nope", &mut session)
        .await;
    assert!(!failed.ok);
    let result = runner.run_in_session("kept", &mut session).await;
    assert_eq!(result.value, Some(Value::from("thing")));
}
