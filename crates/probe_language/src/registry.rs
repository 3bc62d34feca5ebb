//! The capability registry: the only names evaluated code can reach.

use std::collections::BTreeMap;

use im::OrdMap;
use probe_foundation::Value;

/// Map from registered name to capability.
///
/// Backed by a persistent map, so cloning for a run snapshot is cheap and
/// later registrations do not affect a run already in flight.
#[derive(Clone, Debug, Default)]
pub struct CapabilityRegistry {
    entries: OrdMap<String, Value>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges capabilities into the registry. Later writes win.
    pub fn register<I, K>(&mut self, capabilities: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in capabilities {
            let name = name.into();
            if self.entries.contains_key(&name) {
                tracing::debug!(%name, "replacing registered capability");
            }
            self.entries.insert(name, value);
        }
    }

    /// Registers a single capability.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.register([(name.into(), value.into())]);
    }

    /// Looks up a registered capability.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every registered name with the member names its value exposes.
    ///
    /// Used by completion UIs; evaluation never consults it.
    #[must_use]
    pub fn list_members(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.member_names()))
            .collect()
    }
}
