//! `expect(value)` and its matchers.
//!
//! Failures are reported with the `AssertionError` kind and colored
//! expected/received lines, the way test runners print them.

use probe_foundation::{Error, HostObject, Result, Value, arg};

use crate::document::element_id;

/// Kind reported for failed matchers.
pub const ASSERTION_ERROR: &str = "AssertionError";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[39m\x1b[22m";

/// The `expect` capability.
#[must_use]
pub fn expect() -> Value {
    Value::function("expect", |args| Ok(matchers(arg(&args, 0), false)))
}

/// Builds the matcher object for `received`. `.not` flips every matcher.
fn matchers(received: Value, negated: bool) -> Value {
    let mut object = HostObject::new("Matchers");
    if !negated {
        object = object.with("not", matchers(received.clone(), true));
    }

    let check = move |name: &'static str, test: fn(&Value, &Value) -> Result<bool>| {
        let received = received.clone();
        move |args: Vec<Value>| {
            let expected = arg(&args, 0);
            let pass = test(&received, &expected)?;
            if pass == negated {
                Err(failure(name, negated, &received, &expected))
            } else {
                Ok(Value::Undefined)
            }
        }
    };

    object = object
        .with_fn("toBe", check("toBe", |r, e| Ok(same(r, e))))
        .with_fn("toEqual", check("toEqual", |r, e| Ok(same(r, e))))
        .with_fn("toBeNull", check("toBeNull", |r, _| Ok(*r == Value::Null)))
        .with_fn(
            "toBeUndefined",
            check("toBeUndefined", |r, _| Ok(*r == Value::Undefined)),
        )
        .with_fn("toBeTruthy", check("toBeTruthy", |r, _| Ok(r.is_truthy())))
        .with_fn("toBeFalsy", check("toBeFalsy", |r, _| Ok(!r.is_truthy())))
        .with_fn("toBeInTheDocument", check("toBeInTheDocument", in_document))
        .with_fn("toHaveLength", check("toHaveLength", has_length))
        .with_fn("toMatch", check("toMatch", matches_text))
        .with_fn("toHaveTextContent", check("toHaveTextContent", has_text));
    Value::object(object)
}

/// Identity for elements, value equality for everything else.
fn same(received: &Value, expected: &Value) -> bool {
    match (element_id(received), element_id(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => received == expected,
    }
}

fn in_document(received: &Value, _: &Value) -> Result<bool> {
    if received.is_nullish() {
        return Ok(false);
    }
    if element_id(received).is_none() {
        return Err(Error::host(
            ASSERTION_ERROR,
            format!(
                "expect(received).toBeInTheDocument()\n\nreceived value must be an HTMLElement.\nReceived has value: {RED}{received:?}{RESET}"
            ),
        ));
    }
    Ok(received.member("isConnected") == Some(Value::Bool(true)))
}

fn has_length(received: &Value, expected: &Value) -> Result<bool> {
    let length = received.member("length").ok_or_else(|| {
        Error::host(
            ASSERTION_ERROR,
            format!(
                "expect(received).toHaveLength(expected)\n\nreceived value must have a length property.\nReceived has value: {RED}{received:?}{RESET}"
            ),
        )
    })?;
    Ok(length == *expected)
}

fn matches_text(received: &Value, expected: &Value) -> Result<bool> {
    let Some(text) = received.as_str() else {
        return Err(Error::host(
            ASSERTION_ERROR,
            format!("expect(received).toMatch(expected)\n\nreceived value must be a string.\nReceived has value: {RED}{received:?}{RESET}"),
        ));
    };
    if let Some(re) = expected.as_regex() {
        return Ok(re.is_match(text));
    }
    match expected {
        Value::String(s) => Ok(text.contains(s.as_ref())),
        other => Err(Error::host(
            "TypeError",
            format!("toMatch expects a string or regular expression, got {}", other.type_name()),
        )),
    }
}

fn has_text(received: &Value, expected: &Value) -> Result<bool> {
    let text = received
        .member("textContent")
        .and_then(|t| t.as_str().map(str::to_string))
        .unwrap_or_default();
    matches_text(&Value::from(text), expected)
}

fn failure(matcher: &str, negated: bool, received: &Value, expected: &Value) -> Error {
    let not = if negated { ".not" } else { "" };
    let mut message = format!(
        "{DIM}expect({RESET}{RED}received{RESET}{DIM}){not}.{matcher}({RESET}{GREEN}expected{RESET}{DIM}){RESET}\n\n"
    );
    if !matches!(expected, Value::Undefined) {
        let prefix = if negated { "not " } else { "" };
        message.push_str(&format!("Expected: {prefix}{GREEN}{expected:?}{RESET}\n"));
    }
    message.push_str(&format!("Received: {RED}{received:?}{RESET}"));
    Error::host(ASSERTION_ERROR, message)
}
