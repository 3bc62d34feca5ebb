//! Tree-walking evaluator for parsed commands.
//!
//! Evaluation is asynchronous: calling a capability may suspend. Each
//! statement is one future; the caller awaits statements one at a time.
//! Within a statement, call arguments and declarator initializers are
//! evaluated concurrently.
//!
//! # Name resolution
//!
//! An identifier resolves to a registered capability first, then to a local
//! variable declared earlier in the run. A local can never shadow a
//! capability, so the registry stays the authority on what commands reach.

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use probe_foundation::{Error, ErrorContext, Result, Value};

use crate::ast::Node;
use crate::registry::CapabilityRegistry;
use crate::scope::Scope;
use crate::span::Span;

/// Evaluates statements against a registry snapshot.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    registry: CapabilityRegistry,
}

impl Evaluator {
    /// Creates an evaluator over a registry snapshot.
    #[must_use]
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// The registry this evaluator resolves names against.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Executes one top-level statement.
    ///
    /// Returns the value of an expression statement, or `undefined` for a
    /// declaration. Declarations bind into `scope` once every initializer
    /// has resolved.
    ///
    /// # Errors
    /// Returns the first error raised while evaluating the statement.
    pub async fn execute(&self, statement: &Node, scope: &mut Scope) -> Result<Value> {
        match statement {
            Node::ExpressionStatement { expression, .. } => self.eval(expression, scope).await,
            Node::VariableDeclaration { declarations, .. } => {
                let bindings = {
                    let scope: &Scope = scope;
                    try_join_all(
                        declarations
                            .iter()
                            .map(|declarator| self.eval_declarator(declarator, scope)),
                    )
                    .await?
                };
                for (name, value) in bindings {
                    tracing::trace!(%name, "binding local");
                    scope.set(name, value);
                }
                Ok(Value::Undefined)
            }
            other => Err(unexpected(other, "statement")),
        }
    }

    /// Evaluates an expression node.
    ///
    /// Errors carry the position of the innermost node that failed.
    pub fn eval<'a>(&'a self, node: &'a Node, scope: &'a Scope) -> BoxFuture<'a, Result<Value>> {
        async move {
            self.eval_node(node, scope)
                .await
                .map_err(|e| e.or_context(position(node.span())))
        }
        .boxed()
    }

    async fn eval_node(&self, node: &Node, scope: &Scope) -> Result<Value> {
        match node {
            Node::Literal { value, .. } => Ok(value.to_value()),
            Node::Identifier { name, .. } => self.resolve(name, scope),
            Node::AwaitExpression { argument, .. } => self.eval(argument, scope).await,
            Node::CallExpression {
                callee, arguments, ..
            } => self.eval_call(callee, arguments, scope).await,
            Node::MemberExpression {
                object,
                property,
                computed,
                ..
            } => {
                let target = self.eval(object, scope).await?;
                if *computed {
                    index(&target, property)
                } else {
                    member(&target, property)
                }
            }
            other => Err(unexpected(other, "expression")),
        }
    }

    /// Resolves a name: capability first, then local.
    fn resolve(&self, name: &str, scope: &Scope) -> Result<Value> {
        if let Some(value) = self.registry.lookup(name) {
            return Ok(value);
        }
        scope
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_identifier(name))
    }

    async fn eval_call(&self, callee: &Node, arguments: &[Node], scope: &Scope) -> Result<Value> {
        let function = self.eval(callee, scope).await?;
        let args = try_join_all(arguments.iter().map(|arg| self.eval(arg, scope))).await?;
        let Some(host) = function.as_host().filter(|host| host.is_callable()) else {
            return Err(Error::not_callable(callee.callee_name()));
        };
        tracing::trace!(callee = %callee.callee_name(), args = args.len(), "invoking");
        host.invoke(args).await
    }

    async fn eval_declarator(&self, declarator: &Node, scope: &Scope) -> Result<(String, Value)> {
        match declarator {
            Node::VariableDeclarator { name, init, .. } => {
                let value = match init {
                    Some(init) => self.eval(init, scope).await?,
                    None => Value::Undefined,
                };
                Ok((name.clone(), value))
            }
            other => Err(unexpected(other, "declaration")),
        }
    }
}

/// Static member lookup (`target.name`).
fn member(target: &Value, property: &Node) -> Result<Value> {
    let Some(name) = property.as_identifier() else {
        return Err(unexpected(property, "property name"));
    };
    target
        .member(name)
        .filter(|value| !matches!(value, Value::Undefined))
        .ok_or_else(|| Error::unknown_property(name))
}

/// Computed member lookup (`target[key]`). The key must be a literal.
fn index(target: &Value, property: &Node) -> Result<Value> {
    let Node::Literal { value, .. } = property else {
        return Err(Error::syntax(format!(
            "computed member key must be a literal, found {}",
            property.type_name()
        )));
    };
    let key = value.to_value();
    target
        .index(&key)
        .filter(|value| !matches!(value, Value::Undefined))
        .ok_or_else(|| Error::index_out_of_range(format!("{key:?}"), target.describe()))
}

fn unexpected(node: &Node, position: &str) -> Error {
    Error::syntax(format!(
        "unsupported {position} type: {}",
        node.type_name()
    ))
}

fn position(span: Span) -> ErrorContext {
    ErrorContext::new().with_position(span.line, span.column)
}
