use drop_bomb::DropBomb;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::resolver) enum BindingStatus {
    Initialized,
    Uninitialized,
}

/// The stack of lexical scopes the resolver walks through.
///
/// Only nested scopes are tracked: the global scope is not on the stack,
/// so names that are never found here fall back to dynamic lookup against
/// the globals environment at runtime.
#[derive(Debug, Default)]
pub(in crate::resolver) struct ScopeStack {
    scopes: Vec<HashMap<String, BindingStatus>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) -> ScopeGuard {
        self.scopes.push(HashMap::new());
        ScopeGuard(DropBomb::new("You forgot to close a scope"))
    }

    pub fn exit_scope(&mut self, mut guard: ScopeGuard) {
        guard.0.defuse();
        self.scopes.pop();
    }

    /// Record a name in the innermost scope without marking it usable yet.
    /// Returns `false` when the name is already taken in that scope.
    pub fn declare(&mut self, name: &str) -> bool {
        match self.scopes.last_mut() {
            None => true,
            Some(scope) => {
                if scope.contains_key(name) {
                    false
                } else {
                    scope.insert(name.to_string(), BindingStatus::Uninitialized);
                    true
                }
            }
        }
    }

    /// Mark a name as initialized in the innermost scope.
    pub fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), BindingStatus::Initialized);
        }
    }

    /// Number of scopes between the innermost one and the scope holding `name`.
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(name))
    }

    /// Whether the innermost scope holds `name` in its declared-but-unusable
    /// state, i.e. the name is being read from its own initializer.
    pub fn shadows_own_initializer(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.get(name) == Some(&BindingStatus::Uninitialized))
            .unwrap_or(false)
    }
}

/// `ScopeGuard` ensures, at runtime, that we never leave a scope unclosed.
/// The resolver code has no way to defuse the drop bomb (the field is private
/// outside of this module) - the resolver is forced to call
/// [`ScopeStack::exit_scope`], which gives us a chance to pop the currently
/// active scope off the stack.
#[must_use = "Nested scopes must be closed!"]
pub(in crate::resolver) struct ScopeGuard(DropBomb);
