//! Integration tests for the registry and evaluator working together

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use probe_foundation::{HostObject, Result, Value, arg};
use probe_language::{CapabilityRegistry, Evaluator, Node, Scope, parse};

fn registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    let page = HostObject::new("Page")
        .with("title", "Home")
        .with("items", Value::list(["a", "b", "c"].map(Value::from)))
        .with_fn("echo", |args| Ok(arg(&args, 0)))
        .with_async_fn("later", |args| async move {
            tokio::task::yield_now().await;
            Ok(arg(&args, 0))
        });
    registry.insert("page", Value::object(page));
    registry
}

async fn run(evaluator: &Evaluator, source: &str, scope: &mut Scope) -> Result<Value> {
    let program = parse(source)?;
    let mut last = Value::Undefined;
    for statement in program.body().unwrap_or_default() {
        last = evaluator.execute(statement, scope).await?;
    }
    Ok(last)
}

async fn eval(source: &str) -> Result<Value> {
    let evaluator = Evaluator::new(registry());
    run(&evaluator, source, &mut Scope::new()).await
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn evaluates_member_chains() {
    assert_eq!(eval("page.title").await.unwrap(), Value::from("Home"));
    assert_eq!(eval("page.items[1]").await.unwrap(), Value::from("b"));
    assert_eq!(eval("page.items.length").await.unwrap(), Value::from(3));
    assert_eq!(eval("page['title']").await.unwrap(), Value::from("Home"));
}

#[tokio::test]
async fn awaits_async_capabilities() {
    assert_eq!(eval("await page.later('x')").await.unwrap(), Value::from("x"));
    assert_eq!(eval("page.later(page.echo(2))").await.unwrap(), Value::from(2));
}

#[tokio::test]
async fn capability_shadows_local_variable() {
    assert_eq!(eval("const page = 5; page.title").await.unwrap(), Value::from("Home"));
}

#[tokio::test]
async fn declarations_bind_in_scope() {
    let evaluator = Evaluator::new(registry());
    let mut scope = Scope::new();
    run(&evaluator, "const first = page.items[0]; let none", &mut scope)
        .await
        .unwrap();
    assert_eq!(scope.get("first"), Some(&Value::from("a")));
    assert_eq!(scope.get("none"), Some(&Value::Undefined));
    assert_eq!(run(&evaluator, "first", &mut scope).await.unwrap(), Value::from("a"));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn failure_kinds() {
    let kind = |source: &'static str| async move { eval(source).await.unwrap_err().kind_name().to_string() };
    assert_eq!(kind("unknown").await, "UnknownIdentifierError");
    assert_eq!(kind("page.missing").await, "UnknownPropertyError");
    assert_eq!(kind("page.items[10]").await, "IndexOutOfRangeError");
    assert_eq!(kind("page.title()").await, "TypeError");
    assert_eq!(kind("page.items[page.title]").await, "SyntaxError");
}

#[tokio::test]
async fn index_error_describes_target() {
    let err = eval("page.items[10]").await.unwrap_err();
    assert_eq!(err.to_string(), "index 10 is out of range for list of length 3");
}

#[tokio::test]
async fn failing_argument_skips_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = registry();
    registry.insert(
        "count",
        Value::function("count", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Undefined)
        }),
    );
    let evaluator = Evaluator::new(registry);
    let result = run(&evaluator, "count(page.missing)", &mut Scope::new()).await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn program_node_is_not_a_statement() {
    let evaluator = Evaluator::new(registry());
    let program = parse("page").unwrap();
    assert!(matches!(program, Node::Program { .. }));
    let err = evaluator.execute(&program, &mut Scope::new()).await.unwrap_err();
    assert_eq!(err.kind_name(), "SyntaxError");
}
