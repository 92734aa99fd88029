use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runtime::Object;

/// Lexical scope chain
///
/// A cheap handle onto a shared scope: cloning an `Environment` yields another
/// handle to the same bindings, which is how closures capture the scope they
/// were defined in. A scope lives as long as any function value or child
/// scope still refers to it. Scopes are reference counted without cycle
/// collection, so a function bound inside the scope it captures keeps that
/// scope alive for the rest of the process.
#[derive(Clone, Default)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

/// Single scope in the chain
#[derive(Default)]
struct Scope {
    /// Variables defined in this scope
    variables: HashMap<String, Object>,
    /// Enclosing scope (None for the root)
    parent: Option<Environment>,
}

impl Environment {
    /// Creates a root environment with no bindings
    pub fn new() -> Self {
        Environment::default()
    }

    /// Creates a child scope whose lookups fall back to `parent`
    pub fn new_enclosed(parent: &Environment) -> Self {
        Environment {
            scope: Rc::new(RefCell::new(Scope {
                variables: HashMap::new(),
                parent: Some(parent.clone()),
            })),
        }
    }

    /// Looks a name up, walking from the innermost scope outwards
    pub fn get(&self, name: &str) -> Option<Object> {
        let scope = self.scope.borrow();
        match scope.variables.get(name) {
            Some(val) => Some(val.clone()),
            None => scope.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Binds a name in this scope, shadowing any outer binding
    pub fn set(&self, name: impl Into<String>, value: Object) {
        self.scope.borrow_mut().variables.insert(name.into(), value);
    }

    /// Names bound directly in this scope, sorted
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scope.borrow().variables.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Bindings can hold closures over this very scope, so only names are shown.
        let scope = self.scope.borrow();
        f.debug_struct("Environment")
            .field("names", &self.local_names())
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}
