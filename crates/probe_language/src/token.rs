//! Token types for command text.
//!
//! Tokens are the output of the lexer and input to the parser.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
    /// True if a line break separates this token from the previous one.
    pub newline_before: bool,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            span,
            newline_before,
        }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// Token types.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // Punctuation
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Assign,

    // Literals
    /// Number literal like `42` or `0.5`
    Number(f64),
    /// String literal like `"hello"` or `'hello'`
    String(String),
    /// Regular expression literal like `/Hello/i`
    Regex {
        /// Pattern between the slashes.
        pattern: String,
        /// Flags after the closing slash.
        flags: String,
    },
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    // Words
    /// Identifier like `screen`
    Identifier(String),
    /// `const`, `let` or `var`
    Declare(String),
    /// `await`
    Await,
    /// A reserved word of the wider language that commands may not use
    Reserved(String),

    // Meta
    /// An operator outside the supported subset, like `+` or `=>`
    Operator(String),
    /// Template literal (not supported)
    Template,
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::Dot => "'.'".into(),
            Self::Comma => "','".into(),
            Self::Semicolon => "';'".into(),
            Self::Assign => "'='".into(),
            Self::Number(_) => "number".into(),
            Self::String(_) => "string".into(),
            Self::Regex { .. } => "regular expression".into(),
            Self::True => "true".into(),
            Self::False => "false".into(),
            Self::Null => "null".into(),
            Self::Identifier(name) => format!("identifier `{name}`"),
            Self::Declare(word) | Self::Reserved(word) => format!("`{word}`"),
            Self::Await => "`await`".into(),
            Self::Operator(op) => format!("operator `{op}`"),
            Self::Template => "template literal".into(),
            Self::Eof => "end of input".into(),
            Self::Error(_) => "error".into(),
        }
    }
}

/// Words reserved by the wider language; using one is a parse error.
pub(crate) const RESERVED_WORDS: &[&str] = &[
    "async", "break", "case", "catch", "class", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof",
    "new", "return", "super", "switch", "this", "throw", "try", "typeof", "void", "while", "with",
    "yield",
];
