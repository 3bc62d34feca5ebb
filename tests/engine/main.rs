//! Integration tests for Layer 2: Engine
//!
//! Tests for the command runner, log queue, correlator, and result records.

mod correlator;
mod results;
mod runner;
