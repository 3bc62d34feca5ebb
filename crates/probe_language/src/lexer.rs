//! Lexer for command text.
//!
//! The lexer converts source text into a stream of tokens. Comments and
//! whitespace are skipped, but line breaks are remembered on the following
//! token so the parser can end statements without semicolons.

use crate::span::Span;
use crate::token::{RESERVED_WORDS, Token, TokenKind};

/// Characters that make up operators outside the supported subset.
const OPERATOR_CHARS: &str = "+-*%!<>&|^~?:=";

/// Lexer for command text.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let trivia = self.skip_trivia();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let (kind, newline_before) = match trivia {
            Err(message) => (TokenKind::Error(message), false),
            Ok(newline_before) => (self.scan_token(), newline_before),
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
            newline_before,
        )
    }

    /// Tokenizes all source and returns a vector of tokens ending in `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn scan_token(&mut self) -> TokenKind {
        let Some(c) = self.peek_char() else {
            return TokenKind::Eof;
        };

        match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '`' => self.single(TokenKind::Template),
            '.' => {
                if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else if self.rest.starts_with("...") {
                    self.advance_n(3);
                    TokenKind::Operator("...".into())
                } else {
                    self.single(TokenKind::Dot)
                }
            }
            '=' if !matches!(self.peek_char_n(1), Some('=' | '>')) => {
                self.single(TokenKind::Assign)
            }
            '"' | '\'' => self.scan_string(c),
            '/' => self.scan_regex(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => self.scan_word(),
            c if OPERATOR_CHARS.contains(c) => self.scan_operator(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks at the character `n` positions ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Skips whitespace and comments.
    ///
    /// Returns whether a line break was crossed, or an error for an
    /// unterminated block comment.
    fn skip_trivia(&mut self) -> Result<bool, String> {
        let mut newline = false;
        loop {
            match self.peek_char() {
                Some('\n') => {
                    newline = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() => self.advance(),
                Some('/') if self.peek_char_n(1) == Some('/') => {
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    self.advance_n(2);
                    loop {
                        if self.rest.starts_with("*/") {
                            self.advance_n(2);
                            break;
                        }
                        match self.peek_char() {
                            Some('\n') => {
                                newline = true;
                                self.advance();
                            }
                            Some(_) => self.advance(),
                            None => return Err("unterminated block comment".into()),
                        }
                    }
                }
                _ => return Ok(newline),
            }
        }
    }

    /// Scans a string literal delimited by `quote`.
    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // consume opening quote
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.advance();
                    return TokenKind::String(text);
                }
                Some('\\') => {
                    self.advance();
                    match self.scan_escape() {
                        Ok(c) => text.push(c),
                        Err(message) => return TokenKind::Error(message),
                    }
                }
                Some('\n') | None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
            }
        }
    }

    /// Scans the character after a backslash inside a string.
    fn scan_escape(&mut self) -> Result<char, String> {
        let Some(c) = self.peek_char() else {
            return Err("unexpected end of input in string escape".into());
        };
        self.advance();
        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            '0' => Ok('\0'),
            'x' => self.scan_hex_escape(2),
            'u' => self.scan_hex_escape(4),
            '\n' => Err("line continuation in string is not supported".into()),
            other => Ok(other),
        }
    }

    fn scan_hex_escape(&mut self, digits: usize) -> Result<char, String> {
        let hex: String = self.rest.chars().take(digits).collect();
        if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid escape sequence: expected {digits} hex digits"));
        }
        self.advance_n(digits);
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| format!("invalid escape sequence: \\u{hex}"))
    }

    /// Scans a number: decimal with optional fraction and exponent, or hex.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;

        if self.rest.starts_with("0x") || self.rest.starts_with("0X") {
            self.advance_n(2);
            let digits_start = self.position;
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = &self.source[digits_start..self.position];
            if digits.is_empty() {
                return TokenKind::Error("missing hex digits".into());
            }
            if self.peek_char().is_some_and(is_identifier_start) {
                return TokenKind::Error("identifier directly after number".into());
            }
            let value = digits
                .chars()
                .filter_map(|c| c.to_digit(16))
                .fold(0.0, |acc, digit| acc * 16.0 + f64::from(digit));
            return TokenKind::Number(value);
        }

        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        // `5.` is a complete number; the fraction digits are optional.
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_char_n(1), Some('+' | '-')));
            if self.peek_char_n(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                self.advance_n(1 + sign);
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
        if self.peek_char().is_some_and(is_identifier_start) {
            return TokenKind::Error("identifier directly after number".into());
        }

        let text = &self.source[start..self.position];
        match text.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(e) => TokenKind::Error(format!("invalid number: {e}")),
        }
    }

    /// Scans an identifier, keyword, or reserved word.
    fn scan_word(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_identifier_char) {
            self.advance();
        }
        let word = &self.source[start..self.position];

        match word {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "await" => TokenKind::Await,
            "const" | "let" | "var" => TokenKind::Declare(word.to_string()),
            w if RESERVED_WORDS.contains(&w) => TokenKind::Reserved(w.to_string()),
            _ => TokenKind::Identifier(word.to_string()),
        }
    }

    /// Scans a maximal run of operator characters.
    fn scan_operator(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(|c| OPERATOR_CHARS.contains(c)) {
            self.advance();
        }
        TokenKind::Operator(self.source[start..self.position].to_string())
    }

    /// Scans a regular expression literal: `/pattern/flags`.
    ///
    /// Division is not part of the grammar, so a `/` that does not start a
    /// comment always starts a regex.
    fn scan_regex(&mut self) -> TokenKind {
        self.advance(); // consume opening '/'
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            match self.peek_char() {
                Some('\n') | None => {
                    return TokenKind::Error("unterminated regular expression".into());
                }
                Some('\\') => {
                    pattern.push('\\');
                    self.advance();
                    match self.peek_char() {
                        Some('\n') | None => {
                            return TokenKind::Error("unterminated regular expression".into());
                        }
                        Some(c) => {
                            pattern.push(c);
                            self.advance();
                        }
                    }
                }
                Some('/') if !in_class => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    if c == '[' {
                        in_class = true;
                    } else if c == ']' {
                        in_class = false;
                    }
                    pattern.push(c);
                    self.advance();
                }
            }
        }

        let flags_start = self.position;
        while self.peek_char().is_some_and(is_identifier_char) {
            self.advance();
        }
        let flags = self.source[flags_start..self.position].to_string();

        TokenKind::Regex { pattern, flags }
    }
}

/// Returns true if `c` can start an identifier.
fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Returns true if `c` can appear in an identifier (not at start).
fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}
