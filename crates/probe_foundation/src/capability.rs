//! The host interface: everything evaluated code can reach goes through
//! [`Capability`].
//!
//! Hosts either implement the trait directly or build capabilities from
//! [`NativeFn`] and [`HostObject`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::value::Value;
use crate::{Error, Result};

/// A host value reachable from evaluated code.
///
/// This is the single seam between the evaluator and the host: member
/// lookup, member enumeration, and invocation. Invocation is asynchronous
/// so capabilities may wait on host state.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Type name used in diagnostics (`"function"`, `"Screen"`, ...).
    fn type_name(&self) -> &str;

    /// Looks up a member by name.
    fn member(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Names of the members this capability exposes.
    fn member_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Returns true if [`Capability::invoke`] is supported.
    fn is_callable(&self) -> bool {
        false
    }

    /// Invokes the capability with evaluated arguments.
    ///
    /// # Errors
    /// The default implementation reports that the value is not callable.
    async fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        let _ = args;
        Err(Error::not_callable(self.type_name()))
    }

    /// Human-readable rendering used by `Display`.
    fn describe(&self) -> String {
        format!("[object {}]", self.type_name())
    }
}

/// Boxed future returned by native function bodies.
pub type NativeFuture = BoxFuture<'static, Result<Value>>;

type NativeBody = dyn Fn(Vec<Value>) -> NativeFuture + Send + Sync;

/// Native function callable from commands.
#[derive(Clone)]
pub struct NativeFn {
    /// Function name for debugging.
    name: Arc<str>,
    /// Function body.
    body: Arc<NativeBody>,
}

impl NativeFn {
    /// Creates an asynchronous native function.
    #[must_use]
    pub fn new<F, Fut>(name: &str, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(move |args| func(args).boxed()),
        }
    }

    /// Creates a native function that completes without suspending.
    #[must_use]
    pub fn sync<F>(name: &str, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(move |args| future::ready(func(args)).boxed()),
        }
    }

    /// The function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Capability for NativeFn {
    fn type_name(&self) -> &str {
        "function"
    }

    fn member(&self, name: &str) -> Option<Value> {
        (name == "name").then(|| Value::from(self.name()))
    }

    fn member_names(&self) -> Vec<String> {
        vec!["name".to_string()]
    }

    fn is_callable(&self) -> bool {
        true
    }

    async fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        (self.body)(args).await
    }

    fn describe(&self) -> String {
        format!("[function {}]", self.name)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

/// A named bag of members, the usual shape of an object capability.
#[derive(Clone)]
pub struct HostObject {
    name: Arc<str>,
    members: im::OrdMap<String, Value>,
}

impl HostObject {
    /// Creates an empty object with the given type name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            members: im::OrdMap::new(),
        }
    }

    /// Adds (or replaces) a member.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.insert(name.to_string(), value.into());
        self
    }

    /// Adds a synchronous method.
    #[must_use]
    pub fn with_fn<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        let method = Value::host(NativeFn::sync(name, func));
        self.with(name, method)
    }

    /// Adds an asynchronous method.
    #[must_use]
    pub fn with_async_fn<F, Fut>(self, name: &str, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let method = Value::host(NativeFn::new(name, func));
        self.with(name, method)
    }
}

#[async_trait]
impl Capability for HostObject {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn member(&self, name: &str) -> Option<Value> {
        self.members.get(name).cloned()
    }

    fn member_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }
}

/// Returns the argument at `index`, or `undefined` if it was not supplied.
#[must_use]
pub fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}
