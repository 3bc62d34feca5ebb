//! Parser for command text.
//!
//! The parser converts a stream of tokens into an abstract syntax tree.
//! Only a small statement and expression subset is accepted; anything else
//! is rejected with a parse error that names the construct.

use probe_foundation::{Error, ErrorKind, RegexValue, Result};

use crate::ast::{DeclarationKind, LiteralValue, Node};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Deepest expression nesting accepted. Parentheses, `await` and each
/// `.name`, `[key]` or `(args)` suffix count one level.
pub const MAX_NESTING: usize = 64;

/// Parser for command text.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Span of the most recently consumed token.
    previous: Span,
    /// Source text (for error messages).
    source: &'src str,
    /// Current expression nesting depth.
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Span::default(),
            source,
            depth: 0,
        }
    }

    /// Parses the whole source as a program.
    ///
    /// # Errors
    /// Returns a parse error if the source is empty, malformed, or uses a
    /// construct outside the supported subset.
    pub fn parse_program(&mut self) -> Result<Node> {
        let mut body = Vec::new();
        self.skip_semicolons();

        while self.current.kind != TokenKind::Eof {
            body.push(self.parse_statement()?);
            self.expect_separator()?;
            self.skip_semicolons();
        }

        if body.is_empty() {
            return Err(self.error("empty command"));
        }

        Ok(Node::Program {
            body,
            span: Span::new(0, self.source.len(), 1, 1),
        })
    }

    /// Parses one statement: a declaration or an expression.
    fn parse_statement(&mut self) -> Result<Node> {
        if let TokenKind::Declare(word) = &self.current.kind {
            let word = word.clone();
            return self.parse_declaration(&word);
        }

        let expression = self.parse_expression()?;
        let span = expression.span();
        Ok(Node::ExpressionStatement {
            expression: Box::new(expression),
            span,
        })
    }

    /// Parses `const a = 1, b`.
    fn parse_declaration(&mut self, word: &str) -> Result<Node> {
        let start = self.current.span;
        let kind = DeclarationKind::from_keyword(word)
            .ok_or_else(|| self.error(&format!("unexpected `{word}`")))?;
        self.advance();

        let mut declarations = vec![self.parse_declarator()?];
        while self.current.kind == TokenKind::Comma {
            self.advance();
            declarations.push(self.parse_declarator()?);
        }

        Ok(Node::VariableDeclaration {
            kind,
            declarations,
            span: start.to(self.previous),
        })
    }

    /// Parses `name` or `name = expression`.
    fn parse_declarator(&mut self) -> Result<Node> {
        let start = self.current.span;
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::LBrace | TokenKind::LBracket => {
                return Err(self.error("destructuring is not supported"));
            }
            other => {
                let found = other.name();
                return Err(self.error(&format!("expected identifier, found {found}")));
            }
        };
        self.advance();

        let init = if self.current.kind == TokenKind::Assign {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Node::VariableDeclarator {
            name,
            init,
            span: start.to(self.previous),
        })
    }

    /// Parses `await expression` or a postfix expression.
    fn parse_expression(&mut self) -> Result<Node> {
        let outer = self.depth;
        self.enter()?;
        let expression = self.parse_nested_expression();
        self.depth = outer;
        expression
    }

    fn parse_nested_expression(&mut self) -> Result<Node> {
        if self.current.kind == TokenKind::Await {
            let start = self.current.span;
            self.advance();
            let argument = self.parse_expression()?;
            return Ok(Node::AwaitExpression {
                argument: Box::new(argument),
                span: start.to(self.previous),
            });
        }

        let expression = self.parse_postfix()?;
        self.reject_trailing_operator()?;
        Ok(expression)
    }

    /// Parses a primary followed by any number of `.name`, `[key]` and
    /// `(args)` suffixes.
    fn parse_postfix(&mut self) -> Result<Node> {
        let mut expression = self.parse_primary()?;

        loop {
            let start = expression.span();
            if matches!(
                self.current.kind,
                TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen
            ) {
                self.enter()?;
            }
            match self.current.kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_property_name()?;
                    expression = Node::MemberExpression {
                        object: Box::new(expression),
                        property: Box::new(property),
                        computed: false,
                        span: start.to(self.previous),
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let key = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    expression = Node::MemberExpression {
                        object: Box::new(expression),
                        property: Box::new(key),
                        computed: true,
                        span: start.to(self.previous),
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let arguments = self.parse_arguments()?;
                    expression = Node::CallExpression {
                        callee: Box::new(expression),
                        arguments,
                        span: start.to(self.previous),
                    };
                }
                _ => return Ok(expression),
            }
        }
    }

    /// Parses call arguments after `(` up to and including `)`.
    fn parse_arguments(&mut self) -> Result<Vec<Node>> {
        let mut arguments = Vec::new();
        while self.current.kind != TokenKind::RParen {
            if matches!(&self.current.kind, TokenKind::Operator(op) if op == "...") {
                return Err(self.error("spread arguments are not supported"));
            }
            arguments.push(self.parse_expression()?);
            if self.current.kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(arguments)
    }

    /// Parses the name after `.`; keywords are valid property names.
    fn parse_property_name(&mut self) -> Result<Node> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name)
            | TokenKind::Declare(name)
            | TokenKind::Reserved(name) => name.clone(),
            TokenKind::Await => "await".to_string(),
            TokenKind::True => "true".to_string(),
            TokenKind::False => "false".to_string(),
            TokenKind::Null => "null".to_string(),
            other => {
                let found = other.name();
                return Err(self.error(&format!("expected property name, found {found}")));
            }
        };
        let span = self.current.span;
        self.advance();
        Ok(Node::Identifier { name, span })
    }

    /// Parses a literal, an identifier, or a parenthesized expression.
    fn parse_primary(&mut self) -> Result<Node> {
        let span = self.current.span;
        let literal = match &self.current.kind {
            TokenKind::Number(n) => LiteralValue::Number(*n),
            TokenKind::String(s) => LiteralValue::String(s.clone()),
            TokenKind::True => LiteralValue::Bool(true),
            TokenKind::False => LiteralValue::Bool(false),
            TokenKind::Null => LiteralValue::Null,
            TokenKind::Regex { pattern, flags } => {
                let regex = RegexValue::new(pattern, flags)
                    .map_err(|e| self.error_at(span, &e.kind.to_string()))?;
                LiteralValue::Regex(regex)
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                return Ok(Node::Identifier { name, span });
            }
            TokenKind::LParen => {
                self.advance();
                if self.current.kind == TokenKind::RParen {
                    return Err(self.error("arrow functions are not supported"));
                }
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            other => return Err(self.unsupported(other)),
        };
        self.advance();
        Ok(Node::Literal {
            value: literal,
            span,
        })
    }

    /// Rejects an operator or assignment directly after an expression.
    fn reject_trailing_operator(&self) -> Result<()> {
        match &self.current.kind {
            TokenKind::Assign => Err(self.error("assignment is not supported")),
            TokenKind::Operator(op) if op == "=>" => {
                Err(self.error("arrow functions are not supported"))
            }
            TokenKind::Operator(op) => {
                Err(self.error(&format!("operator `{op}` is not supported")))
            }
            TokenKind::Template => Err(self.error("tagged templates are not supported")),
            _ => Ok(()),
        }
    }

    /// Builds the error for a token that cannot start an expression.
    fn unsupported(&self, kind: &TokenKind) -> Error {
        let message = match kind {
            TokenKind::Reserved(word) => format!("`{word}` is not supported"),
            TokenKind::Declare(word) => format!("`{word}` is only allowed at statement start"),
            TokenKind::Operator(op) => format!("operator `{op}` is not supported"),
            TokenKind::Template => "template literals are not supported".to_string(),
            TokenKind::LBrace => "object literals are not supported".to_string(),
            TokenKind::LBracket => "array literals are not supported".to_string(),
            TokenKind::Eof => "unexpected end of input".to_string(),
            TokenKind::Error(message) => message.clone(),
            other => format!("unexpected {}", other.name()),
        };
        self.error(&message)
    }

    /// Requires a statement separator: `;`, a line break, or end of input.
    fn expect_separator(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ if self.current.newline_before => Ok(()),
            _ => {
                self.reject_trailing_operator()?;
                let found = self.current.kind.name();
                Err(self.error(&format!("expected ';' or line break, found {found}")))
            }
        }
    }

    /// Descends one nesting level.
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn skip_semicolons(&mut self) {
        while self.current.kind == TokenKind::Semicolon {
            self.advance();
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.previous = self.current.span;
        self.current = self.lexer.next_token();
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected) {
            self.advance();
            Ok(())
        } else if let TokenKind::Error(message) = &self.current.kind {
            Err(self.error(message))
        } else {
            let expected_name = expected.name();
            Err(self.error(&format!(
                "expected {expected_name}, found {}",
                self.current.kind.name()
            )))
        }
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    /// Gets the source line containing a span for error messages.
    fn context_at(&self, span: Span) -> String {
        let start = span.start.min(self.source.len());
        let before = self.source.get(..start).unwrap_or("");
        let after = self.source.get(start..).unwrap_or("");
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let line_end = after.find('\n').map_or(self.source.len(), |i| start + i);

        self.source
            .get(line_start..line_end)
            .unwrap_or("")
            .to_string()
    }
}

/// Parses command text into a `Program` node.
///
/// # Errors
/// Returns a parse error if the text is empty, malformed, or uses an
/// unsupported construct.
pub fn parse(source: &str) -> Result<Node> {
    Parser::new(source).parse_program()
}
