//! Probe - sandboxed command console
//!
//! This crate re-exports all layers of the Probe system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: probe_runtime    - REPL, CLI, demo host, log capture
//! Layer 2: probe_engine     - Command runner, log queue, diagnostic correlation
//! Layer 1: probe_language   - Lexer, parser, capability registry, evaluator
//! Layer 0: probe_foundation - Core types (Value, Capability, Error)
//! ```

pub use probe_engine as engine;
pub use probe_foundation as foundation;
pub use probe_language as language;
pub use probe_runtime as runtime;
