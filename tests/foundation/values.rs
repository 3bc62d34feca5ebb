//! Integration tests for Value and host capability helpers

use probe_foundation::{Capability, HostObject, List, NativeFn, RegexValue, Value, arg};

// =============================================================================
// Truthiness and Display
// =============================================================================

#[test]
fn truthiness_follows_console_rules() {
    assert!(!Value::Undefined.is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(!Value::from(0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(Value::from("x").is_truthy());
    assert!(Value::List(List::new()).is_truthy());
}

#[test]
fn numbers_print_without_trailing_zero() {
    assert_eq!(Value::from(3).to_string(), "3");
    assert_eq!(Value::from(1.5).to_string(), "1.5");
}

#[test]
fn strings_debug_quoted() {
    let list = Value::list([Value::from("a"), Value::from(1)]);
    assert_eq!(list.to_string(), "[\"a\", 1]");
}

// =============================================================================
// Member and Index Lookup
// =============================================================================

#[test]
fn list_length_and_index() {
    let list = Value::list([1, 2, 3].map(Value::from));
    assert_eq!(list.member("length"), Some(Value::from(3)));
    assert_eq!(list.index(&Value::from(0)), Some(Value::from(1)));
    assert_eq!(list.index(&Value::from(10)), None);
    assert_eq!(list.index(&Value::from(-1)), None);
}

#[test]
fn string_index_returns_character() {
    let text = Value::from("héllo");
    assert_eq!(text.index(&Value::from(1)), Some(Value::from("é")));
    assert_eq!(text.index(&Value::from("length")), Some(Value::from(5)));
}

#[test]
fn host_object_members() {
    let object = Value::object(
        HostObject::new("Thing")
            .with("name", "thing")
            .with_fn("noop", |_| Ok(Value::Undefined)),
    );
    assert_eq!(object.member("name"), Some(Value::from("thing")));
    assert!(object.member("noop").is_some_and(|m| m.is_callable()));
    assert!(!object.is_callable());
    assert_eq!(object.member_names(), vec!["name", "noop"]);
}

#[test]
fn host_values_compare_by_identity() {
    let a = Value::function("f", |_| Ok(Value::Null));
    let b = Value::function("f", |_| Ok(Value::Null));
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

// =============================================================================
// Invocation
// =============================================================================

#[tokio::test]
async fn native_fn_receives_arguments() {
    let add = NativeFn::sync("add", |args| {
        let a = arg(&args, 0).as_number().unwrap_or_default();
        let b = arg(&args, 1).as_number().unwrap_or_default();
        Ok(Value::from(a + b))
    });
    let result = add.invoke(vec![Value::from(2), Value::from(3)]).await.unwrap();
    assert_eq!(result, Value::from(5));
}

#[tokio::test]
async fn async_native_fn_awaits() {
    let later = NativeFn::new("later", |args| async move {
        tokio::task::yield_now().await;
        Ok(arg(&args, 0))
    });
    assert_eq!(
        later.invoke(vec![Value::from("done")]).await.unwrap(),
        Value::from("done")
    );
}

// =============================================================================
// Regex Literals
// =============================================================================

#[test]
fn regex_flags() {
    let re = RegexValue::new("^item", "i").unwrap();
    assert!(re.is_match("Item one"));
    assert_eq!(re.to_string(), "/^item/i");
    assert!(RegexValue::new("a", "q").is_err());
}
