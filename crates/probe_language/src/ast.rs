//! Abstract Syntax Tree for command text.
//!
//! Every node carries the source span it was parsed from. Node shapes follow
//! the ESTree naming used by hosts that render or inspect commands.

use std::fmt;

use probe_foundation::{RegexValue, Value};

use crate::span::Span;

/// Kind of variable declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `const`
    Const,
    /// `let`
    Let,
    /// `var`
    Var,
}

impl DeclarationKind {
    /// Parses a declaration keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "const" => Some(Self::Const),
            "let" => Some(Self::Let),
            "var" => Some(Self::Var),
            _ => None,
        }
    }

    /// The keyword as written in source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::Let => "let",
            Self::Var => "var",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Value of a literal node.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// Number literal like `42` or `0.5`
    Number(f64),
    /// String literal like `'hello'`
    String(String),
    /// Regular expression literal, compiled at parse time
    Regex(RegexValue),
}

impl LiteralValue {
    /// Converts the literal into a runtime value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(*n),
            Self::String(s) => Value::from(s.as_str()),
            Self::Regex(re) => Value::Regex(re.clone()),
        }
    }
}

/// An AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A whole command: one or more statements.
    Program {
        /// Top-level statements in source order.
        body: Vec<Node>,
        /// Source span.
        span: Span,
    },
    /// An expression evaluated for effect.
    ExpressionStatement {
        /// The expression.
        expression: Box<Node>,
        /// Source span.
        span: Span,
    },
    /// `const a = 1, b`
    VariableDeclaration {
        /// Declaration keyword.
        kind: DeclarationKind,
        /// One or more `VariableDeclarator` nodes.
        declarations: Vec<Node>,
        /// Source span.
        span: Span,
    },
    /// `a = 1` inside a declaration.
    VariableDeclarator {
        /// Bound name.
        name: String,
        /// Initializer, if any.
        init: Option<Box<Node>>,
        /// Source span.
        span: Span,
    },
    /// `await expr`
    AwaitExpression {
        /// Awaited expression.
        argument: Box<Node>,
        /// Source span.
        span: Span,
    },
    /// A literal value.
    Literal {
        /// The literal.
        value: LiteralValue,
        /// Source span.
        span: Span,
    },
    /// A name.
    Identifier {
        /// The name.
        name: String,
        /// Source span.
        span: Span,
    },
    /// `callee(args)`
    CallExpression {
        /// Called expression.
        callee: Box<Node>,
        /// Argument expressions.
        arguments: Vec<Node>,
        /// Source span.
        span: Span,
    },
    /// `object.name` or `object[key]`
    MemberExpression {
        /// Object expression.
        object: Box<Node>,
        /// Static name (an `Identifier`) or computed key expression.
        property: Box<Node>,
        /// True for `object[key]`.
        computed: bool,
        /// Source span.
        span: Span,
    },
}

impl Node {
    /// Returns the source span of this node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Program { span, .. }
            | Self::ExpressionStatement { span, .. }
            | Self::VariableDeclaration { span, .. }
            | Self::VariableDeclarator { span, .. }
            | Self::AwaitExpression { span, .. }
            | Self::Literal { span, .. }
            | Self::Identifier { span, .. }
            | Self::CallExpression { span, .. }
            | Self::MemberExpression { span, .. } => *span,
        }
    }

    /// Returns the node type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Program { .. } => "Program",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::VariableDeclaration { .. } => "VariableDeclaration",
            Self::VariableDeclarator { .. } => "VariableDeclarator",
            Self::AwaitExpression { .. } => "AwaitExpression",
            Self::Literal { .. } => "Literal",
            Self::Identifier { .. } => "Identifier",
            Self::CallExpression { .. } => "CallExpression",
            Self::MemberExpression { .. } => "MemberExpression",
        }
    }

    /// Returns the statements of a program, or `None` for other nodes.
    #[must_use]
    pub fn body(&self) -> Option<&[Node]> {
        match self {
            Self::Program { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns the name if this is an identifier.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns true if this node is a statement.
    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::ExpressionStatement { .. } | Self::VariableDeclaration { .. }
        )
    }

    /// Short name used when this node is called: the identifier or the
    /// accessed property, falling back to the node type.
    #[must_use]
    pub fn callee_name(&self) -> String {
        match self {
            Self::Identifier { name, .. } => name.clone(),
            Self::MemberExpression {
                property,
                computed: false,
                ..
            } => property.callee_name(),
            Self::MemberExpression {
                property,
                computed: true,
                ..
            } => match property.as_ref() {
                Self::Literal { value, .. } => value.to_value().to_string(),
                other => other.type_name().to_string(),
            },
            other => other.type_name().to_string(),
        }
    }
}
