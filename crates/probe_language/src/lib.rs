//! Lexer, parser, capability registry, and evaluator for Probe commands.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of command text
//! - [`parse`] - Parsing command text into a [`Node::Program`]
//! - [`CapabilityRegistry`] - The names commands can reach
//! - [`Evaluator`] - Asynchronous tree-walking evaluation of statements

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod scope;
pub mod span;
pub mod token;

pub use ast::{DeclarationKind, LiteralValue, Node};
pub use evaluator::Evaluator;
pub use lexer::Lexer;
pub use parser::{Parser, parse};
pub use registry::CapabilityRegistry;
pub use scope::Scope;
pub use span::Span;
pub use token::{Token, TokenKind};
