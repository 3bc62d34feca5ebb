//! Integration tests for the parser

use probe_foundation::ErrorKind;
use probe_language::{DeclarationKind, Node, parse};

fn body(source: &str) -> Vec<Node> {
    match parse(source).unwrap() {
        Node::Program { body, .. } => body,
        other => panic!("expected Program, got {other:?}"),
    }
}

fn message(source: &str) -> String {
    match parse(source).unwrap_err().kind {
        ErrorKind::ParseError { message, .. } => message,
        other => panic!("expected ParseError, got {other:?}"),
    }
}

// =============================================================================
// Accepted Commands
// =============================================================================

#[test]
fn parse_testing_library_style_command() {
    let body = body("expect(within(screen.getByTestId('list')).getAllByText(/Item/)).toHaveLength(3)");
    assert_eq!(body.len(), 1);
    assert!(body[0].is_statement());
    assert_eq!(body[0].type_name(), "ExpressionStatement");
}

#[test]
fn parse_multiline_script() {
    let body = body(
        "const list = screen.getByTestId('list')\n\
         let items = within(list).getAllByText(/Item/);\n\
         items[0]",
    );
    assert_eq!(body.len(), 3);
    assert!(matches!(
        &body[1],
        Node::VariableDeclaration { kind: DeclarationKind::Let, .. }
    ));
}

#[test]
fn spans_cover_statement_text() {
    let source = "a;  screen.getByText('x')";
    let body = body(source);
    assert_eq!(body[1].span().text(source), "screen.getByText('x')");
}

// =============================================================================
// Rejected Commands
// =============================================================================

#[test]
fn rejects_outside_subset() {
    assert!(message("if (a) b").contains("`if`"));
    assert!(message("a ? b : c").contains("operator"));
    assert!(message("f(...args)").contains("not supported"));
    assert!(message("const { a } = b").contains("destructuring"));
}

#[test]
fn rejects_dangling_input() {
    for source in ["screen.", "f(", "a[0", "await"] {
        assert!(parse(source).is_err(), "{source} should not parse");
    }
}

#[test]
fn parse_error_carries_source_line() {
    let err = parse("ok()\nbad +\nmore()").unwrap_err();
    let ErrorKind::ParseError { line, context, .. } = err.kind else {
        panic!("expected ParseError");
    };
    assert_eq!(line, 2);
    assert_eq!(context, "bad +");
}
