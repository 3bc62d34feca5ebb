//! Sessions: local variables that outlive a single run.

use probe_foundation::Value;
use probe_language::Scope;

/// State shared by consecutive runs, such as the lines of a REPL.
///
/// Declarations made by a run stay visible to later runs in the same
/// session, including those made before a failing statement.
#[derive(Clone, Debug, Default)]
pub struct Session {
    /// Session-local variable bindings.
    scope: Scope,

    /// Number of runs executed in this session.
    runs: usize,

    /// Value of the last successful run.
    last_value: Option<Value>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The session's variables.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Mutable access to the session's variables.
    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Number of runs executed so far.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs
    }

    /// Value of the most recent successful run.
    #[must_use]
    pub fn last_value(&self) -> Option<&Value> {
        self.last_value.as_ref()
    }

    /// Forgets every variable and the last value.
    pub fn reset(&mut self) {
        self.scope.clear();
        self.last_value = None;
    }

    pub(crate) fn record_run(&mut self, value: Option<Value>) {
        self.runs += 1;
        if value.is_some() {
            self.last_value = value;
        }
    }
}
