//! Integration tests for the lexer

use probe_language::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source).into_iter().map(|t| t.kind).collect()
}

// =============================================================================
// Command Shapes
// =============================================================================

#[test]
fn lex_query_call() {
    assert_eq!(
        kinds("screen.getByText('Hi')"),
        vec![
            TokenKind::Identifier("screen".into()),
            TokenKind::Dot,
            TokenKind::Identifier("getByText".into()),
            TokenKind::LParen,
            TokenKind::String("Hi".into()),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_regex_argument() {
    assert_eq!(
        kinds("f(/a[/]b/gi)")[2],
        TokenKind::Regex {
            pattern: "a[/]b".into(),
            flags: "gi".into(),
        }
    );
}

#[test]
fn lex_declaration_and_await() {
    let kinds = kinds("const el = await find()");
    assert_eq!(kinds[0], TokenKind::Declare("const".into()));
    assert_eq!(kinds[2], TokenKind::Assign);
    assert_eq!(kinds[3], TokenKind::Await);
}

#[test]
fn lex_string_escapes() {
    assert_eq!(
        kinds(r#""tab\there A\x42""#)[0],
        TokenKind::String("tab\there AB".into())
    );
}

// =============================================================================
// Positions and Line Breaks
// =============================================================================

#[test]
fn lex_tracks_lines_and_columns() {
    let tokens = Lexer::tokenize_all("a;\n  bb");
    let bb = &tokens[2];
    assert_eq!((bb.span.line, bb.span.column), (2, 3));
    assert!(bb.newline_before);
    assert!(!tokens[1].newline_before);
}

#[test]
fn lex_comments_are_trivia() {
    assert_eq!(
        kinds("a /* note */ // rest\n"),
        vec![TokenKind::Identifier("a".into()), TokenKind::Eof]
    );
}

#[test]
fn lexer_reports_unterminated_comment() {
    let mut lexer = Lexer::new("a /* open");
    assert_eq!(lexer.next_token().kind, TokenKind::Identifier("a".into()));
    assert!(matches!(lexer.next_token().kind, TokenKind::Error(_)));
}

#[test]
fn lex_unsupported_syntax_still_tokenizes() {
    let kinds = kinds("`x` + {}");
    assert_eq!(kinds[0], TokenKind::Template);
    assert_eq!(kinds[3], TokenKind::Operator("+".into()));
    assert_eq!(kinds[4], TokenKind::LBrace);
}
