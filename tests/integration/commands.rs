//! Commands against the demo host

use std::time::Duration;

use probe_engine::{CommandRunner, RunResult, RunnerConfig};
use probe_foundation::Value;
use probe_runtime::{Document, install_demo_host};

fn setup() -> (CommandRunner, Document) {
    let document = Document::sample();
    let mut runner = CommandRunner::new(RunnerConfig::default().with_settle_delay(Duration::ZERO));
    install_demo_host(&mut runner, &document);
    (runner, document)
}

async fn run(source: &str) -> RunResult {
    let (runner, _document) = setup();
    runner.run(source).await
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn simple_query() {
    let result = run("screen.getByText('Welcome to Probe')").await;
    assert!(result.ok, "{:?}", result.error);
    let element = result.value.unwrap();
    assert_eq!(element.member("textContent"), Some(Value::from("Welcome to Probe")));
}

#[tokio::test]
async fn scoped_query_with_regex() {
    let result = run(
        "const list = screen.getByTestId('list')\n\
         expect(within(list).getAllByText(/^item/i)).toHaveLength(3)",
    )
    .await;
    assert!(result.ok, "{:?}", result.error);
}

#[tokio::test]
async fn indexing_query_results() {
    let result = run("screen.getAllByText(/Item/)[1].textContent").await;
    assert_eq!(result.value, Some(Value::from("Item one")));

    let result = run("screen.getAllByText(/Item/)[10]").await;
    assert_eq!(result.error_kind(), Some("IndexOutOfRangeError"));
    assert_eq!(
        result.error_message(),
        Some("index 10 is out of range for list of length 4")
    );
}

#[tokio::test]
async fn query_failure_is_host_error() {
    let result = run("screen.getByText('Nowhere')").await;
    assert_eq!(result.error_kind(), Some("TestingLibraryElementError"));
    assert!(result.error_message().unwrap().starts_with("Unable to find an element"));
    assert_eq!(result.statement_index, Some(0));
}

#[tokio::test]
async fn query_by_returns_null() {
    let result = run("expect(screen.queryByText('Nowhere')).toBeNull()").await;
    assert!(result.ok, "{:?}", result.error);
}

// =============================================================================
// Assertions
// =============================================================================

#[tokio::test]
async fn failed_assertion_is_sanitized() {
    let result = run("expect(screen.getByTestId('login')).toHaveTextContent('Sign up')").await;
    assert_eq!(result.error_kind(), Some("AssertionError"));
    let message = result.error_message().unwrap();
    assert!(!message.contains('\u{1b}'));
    assert!(message.starts_with("expect(received).toHaveTextContent(expected)"));
}

#[tokio::test]
async fn removed_element_is_not_in_document() {
    let result = run(
        "const login = screen.getByTestId('login')\n\
         document.remove(login)\n\
         expect(login).not.toBeInTheDocument()",
    )
    .await;
    assert!(result.ok, "{:?}", result.error);
}

// =============================================================================
// Async Host Work
// =============================================================================

#[tokio::test(start_paused = true)]
async fn find_waits_for_late_element() {
    let result = run(
        "document.appendLater(200, 'Loaded')\n\
         await screen.findByText('Loaded')",
    )
    .await;
    assert!(result.ok, "{:?}", result.error);
}

#[tokio::test(start_paused = true)]
async fn find_times_out() {
    let result = run("await screen.findByText('Never', 100)").await;
    assert_eq!(result.error_kind(), Some("TestingLibraryElementError"));
}

// =============================================================================
// Host State
// =============================================================================

#[tokio::test]
async fn highlight_marks_snapshot() {
    let (runner, document) = setup();
    let result = runner.run("highlight(screen.getByTestId('login'))").await;
    assert!(result.ok, "{:?}", result.error);
    assert!(document.render().contains("* <div data-testid=\"login\">Log in</div>"));
}

#[tokio::test]
async fn highlight_requires_element() {
    let result = run("highlight(screen.queryByText('Nowhere'))").await;
    assert_eq!(result.error_kind(), Some("ReferenceError"));
}

#[tokio::test]
async fn precedence_is_capability_first() {
    let result = run("const screen = 5; screen.getByTestId('login').testId").await;
    assert_eq!(result.value, Some(Value::from("login")));
}

#[tokio::test]
async fn unsupported_syntax_is_parse_error() {
    let result = run("screen.getAllByText(/Item/).length > 2").await;
    assert_eq!(result.error_kind(), Some("ParseError"));
    assert_eq!(result.statement_index, None);
}
