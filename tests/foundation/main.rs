//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Capability helpers, RegexValue, and Error.

mod errors;
mod values;
