//! Local variable bindings for one run (or one session).

use std::collections::HashMap;

use probe_foundation::Value;

/// Names declared by `const`, `let` or `var` statements.
///
/// There is no nesting: the grammar has no blocks, so every declaration
/// lands in the same frame. Redeclaring a name rebinds it.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: HashMap<String, Value>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any earlier binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Gets a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Removes every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
