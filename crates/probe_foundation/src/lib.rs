//! Core values, the capability host interface, and errors for Probe.
//!
//! This crate provides:
//! - [`Value`] - The value type every command evaluates to
//! - [`Capability`] - The single host interface (member lookup, invocation)
//! - [`NativeFn`] and [`HostObject`] - Building blocks for host capabilities
//! - [`RegexValue`] - Compiled regular expression literals
//! - [`Error`] - Error types with stable kind names

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod capability;
pub mod error;
pub mod pattern;
pub mod value;

// Hosts implementing `Capability` need the same attribute macro.
pub use async_trait::async_trait;
pub use capability::{Capability, HostObject, NativeFn, NativeFuture, arg};
pub use error::{Error, ErrorContext, ErrorKind};
pub use pattern::RegexValue;
pub use value::{List, Value};

/// Result type alias using the Probe error type.
pub type Result<T> = std::result::Result<T, Error>;
