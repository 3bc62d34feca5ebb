//! Integration tests for Layer 1: Language
//!
//! Tests for the lexer, parser, capability registry, and evaluator.

mod evaluator;
mod lexer;
mod parser;
