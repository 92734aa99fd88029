//! Native functions callable from Monkey code
//!
//! Builtins are consulted only after an identifier is not found in the scope
//! chain, so user bindings shadow them.

pub mod stdlib;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::runtime::Object;

/// Builtin trait - every native function implements this
pub trait Builtin: Send + Sync {
    /// Name the function is looked up by
    fn name(&self) -> &str;

    /// Runs the function on already-evaluated arguments
    ///
    /// Implementations check their own argument count and types.
    fn execute(&self, args: &[Object]) -> Result<Object>;
}

/// Name-indexed set of builtins
#[derive(Clone)]
pub struct BuiltinRegistry {
    builtins: HashMap<String, Arc<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// Create new registry with `len`, `append` and `put`
    pub fn new() -> Self {
        let mut registry = BuiltinRegistry::empty();
        stdlib::register_all(&mut registry);
        registry
    }

    /// Create empty registry
    pub fn empty() -> Self {
        BuiltinRegistry {
            builtins: HashMap::new(),
        }
    }

    /// Register a builtin, replacing any previous one with the same name
    pub fn register<B: Builtin + 'static>(&mut self, builtin: B) {
        let name = builtin.name().to_string();
        self.builtins.insert(name, Arc::new(builtin));
    }

    /// Get builtin by exact name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Builtin>> {
        self.builtins.get(name).cloned()
    }

    /// List all builtin names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.builtins.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("builtins", &self.names())
            .finish()
    }
}

impl std::fmt::Debug for dyn Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name())
    }
}
