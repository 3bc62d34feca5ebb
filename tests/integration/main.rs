//! Cross-layer integration tests for Probe
//!
//! Runs commands against the demo document host, the way a console
//! attached to a page would.

mod commands;
mod log_capture;
