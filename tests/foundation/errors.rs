//! Integration tests for Error types
//!
//! Tests error construction, display, context, and kind names.

use probe_foundation::{Error, ErrorContext, ErrorKind};

// =============================================================================
// Kind Names
// =============================================================================

#[test]
fn kind_names_are_stable() {
    assert_eq!(Error::unknown_identifier("x").kind_name(), "UnknownIdentifierError");
    assert_eq!(Error::unknown_property("x").kind_name(), "UnknownPropertyError");
    assert_eq!(
        Error::index_out_of_range("10", "list of length 3").kind_name(),
        "IndexOutOfRangeError"
    );
    assert_eq!(Error::syntax("bad").kind_name(), "SyntaxError");
    assert_eq!(Error::not_callable("x").kind_name(), "TypeError");
    assert_eq!(Error::async_console("boom").kind_name(), "AsyncConsoleError");
    assert_eq!(Error::internal("oops").kind_name(), "InternalError");
    assert_eq!(Error::host("AssertionError", "no").kind_name(), "AssertionError");
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn unknown_identifier_message() {
    assert_eq!(Error::unknown_identifier("unknown").to_string(), "\"unknown\" is not valid");
}

#[test]
fn index_out_of_range_message() {
    let err = Error::index_out_of_range("10", "list of length 3");
    assert_eq!(err.to_string(), "index 10 is out of range for list of length 3");
}

#[test]
fn async_console_message_keeps_original_text() {
    let msg = Error::async_console("Warning: late update").to_string();
    assert!(msg.starts_with("Error printed to console.error."));
    assert!(msg.ends_with("\n\nWarning: late update"));
}

#[test]
fn host_error_displays_message_only() {
    assert_eq!(Error::host("QueryError", "nothing found").to_string(), "nothing found");
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn or_context_keeps_innermost() {
    let err = Error::unknown_property("missing")
        .or_context(ErrorContext::new().with_position(1, 5))
        .or_context(ErrorContext::new().with_position(1, 1));
    let context = err.context.unwrap();
    assert_eq!((context.line, context.column), (Some(1), Some(5)));
}

#[test]
fn parse_error_fields() {
    let err = Error::new(ErrorKind::ParseError {
        message: "unexpected token".into(),
        line: 2,
        column: 4,
        context: "a b".into(),
    });
    assert_eq!(err.kind_name(), "ParseError");
    assert_eq!(err.to_string(), "parse error at 2:4: unexpected token");
}
