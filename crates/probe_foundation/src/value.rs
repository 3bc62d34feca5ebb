//! Core value type for everything a command can touch.

use std::fmt;
use std::sync::Arc;

use crate::capability::{Capability, HostObject, NativeFn};
use crate::pattern::RegexValue;
use crate::Result;

/// Persistent list used for array-like values.
pub type List = im::Vector<Value>;

/// A value produced or consumed by command evaluation.
///
/// Values are cheaply cloneable: strings and host values are reference
/// counted and lists share structure.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value (missing argument, declarator without initializer).
    Undefined,
    /// The `null` literal.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Double-precision number (the only numeric type).
    Number(f64),
    /// String value.
    String(Arc<str>),
    /// Regular expression literal.
    Regex(RegexValue),
    /// Array-like list.
    List(List),
    /// Opaque host capability (object, function, or both).
    Host(Arc<dyn Capability>),
}

impl Value {
    /// Wraps a host capability.
    #[must_use]
    pub fn host<C: Capability + 'static>(capability: C) -> Self {
        Self::Host(Arc::new(capability))
    }

    /// Creates a synchronous native function value.
    #[must_use]
    pub fn function<F>(name: &str, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::host(NativeFn::sync(name, func))
    }

    /// Creates an object value from a [`HostObject`].
    #[must_use]
    pub fn object(object: HostObject) -> Self {
        Self::host(object)
    }

    /// Creates a list value.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns a short type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Regex(_) => "regex",
            Self::List(_) => "list",
            Self::Host(cap) => cap.type_name(),
        }
    }

    /// Returns true for `undefined` and `null`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Returns true if this value is truthy.
    ///
    /// `undefined`, `null`, `false`, `0`, `NaN` and the empty string are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Regex(_) | Self::List(_) | Self::Host(_) => true,
        }
    }

    /// Returns true if this value can be invoked.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Host(cap) if cap.is_callable())
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a list reference.
    #[must_use]
    pub const fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to extract a regex.
    #[must_use]
    pub const fn as_regex(&self) -> Option<&RegexValue> {
        match self {
            Self::Regex(re) => Some(re),
            _ => None,
        }
    }

    /// Attempts to extract a host capability.
    #[must_use]
    pub const fn as_host(&self) -> Option<&Arc<dyn Capability>> {
        match self {
            Self::Host(cap) => Some(cap),
            _ => None,
        }
    }

    /// Looks up a static member by name.
    ///
    /// Host values delegate to [`Capability::member`]; lists and strings
    /// expose `length`. Everything else has no members.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Value> {
        match self {
            Self::Host(cap) => cap.member(name),
            Self::List(items) if name == "length" => Some(len_value(items.len())),
            Self::String(s) if name == "length" => Some(len_value(s.chars().count())),
            Self::Regex(re) => match name {
                "source" => Some(Self::from(re.source())),
                "flags" => Some(Self::from(re.flags())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Looks up a computed key (`value[key]`).
    ///
    /// Numeric keys index lists and strings, as do canonical integer
    /// strings such as `'0'`. Other string keys fall back to
    /// [`Value::member`].
    #[must_use]
    pub fn index(&self, key: &Value) -> Option<Value> {
        match (self, key) {
            (Self::List(_) | Self::String(_), Self::String(name)) => match canonical_index(name) {
                Some(i) => self.index(&len_value(i)),
                None => self.member(name),
            },
            (Self::List(items), Self::Number(n)) => {
                as_index(*n).and_then(|i| items.get(i).cloned())
            }
            (Self::String(s), Self::Number(n)) => as_index(*n)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Self::String(c.to_string().into())),
            (_, Self::String(name)) => self.member(name),
            _ => None,
        }
    }

    /// Names of the members this value exposes, for introspection.
    #[must_use]
    pub fn member_names(&self) -> Vec<String> {
        match self {
            Self::Host(cap) => cap.member_names(),
            Self::List(_) | Self::String(_) => vec!["length".to_string()],
            Self::Regex(_) => vec!["source".to_string(), "flags".to_string()],
            _ => Vec::new(),
        }
    }

    /// Short description used in index errors, e.g. `list of length 3`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::List(items) => format!("list of length {}", items.len()),
            Self::String(s) => format!("string {s:?} of length {}", s.chars().count()),
            Self::Host(cap) => cap.describe(),
            other => other.type_name().to_string(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn len_value(len: usize) -> Value {
    Value::Number(len as f64)
}

/// `"3"` but not `"03"`, `"+3"` or `"3.0"`.
fn canonical_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok()?;
    (index.to_string() == key).then_some(index)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_index(n: f64) -> Option<usize> {
    if n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}

/// Formats a number the way the console prints it (`3`, not `3.0`).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Host(a), Self::Host(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => format_number(*n, f),
            Self::String(s) => write!(f, "{s}"),
            Self::Regex(re) => write!(f, "{re}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                write!(f, "]")
            }
            Self::Host(cap) => write!(f, "{}", cap.describe()),
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<RegexValue> for Value {
    fn from(re: RegexValue) -> Self {
        Self::Regex(re)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items.into_iter().collect())
    }
}

impl From<HostObject> for Value {
    fn from(object: HostObject) -> Self {
        Self::host(object)
    }
}
