use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{RuntimeError, Value};

/// A chain of scopes, innermost first.
///
/// Clones share the underlying scopes, so a closure holding a clone sees
/// every later `define`/`set!` made through any other handle to the same
/// scopes.
#[derive(Clone, Default)]
pub struct Environment {
    scope: Rc<Scope>,
}

#[derive(Default)]
struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new environment whose innermost scope holds `bindings`, in front of
    /// this chain. `self` is left untouched.
    pub fn extend(&self, bindings: HashMap<String, Value>) -> Environment {
        Environment {
            scope: Rc::new(Scope {
                bindings: RefCell::new(bindings),
                parent: Some(Rc::clone(&self.scope)),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = Some(&self.scope);
        while let Some(current) = scope {
            if let Some(value) = current.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            scope = current.parent.as_ref();
        }
        None
    }

    /// Binds `name` in the innermost scope, replacing any binding it already
    /// had there.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.scope.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Rebinds `name` in the nearest scope that already contains it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut scope = Some(&self.scope);
        while let Some(current) = scope {
            if let Some(slot) = current.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return Ok(());
            }
            scope = current.parent.as_ref();
        }
        Err(RuntimeError::UnboundVariable(name.to_string()))
    }
}

#[test]
fn lookup_walks_outward() {
    let root = Environment::new();
    root.define("x", Value::Int(1));
    root.define("y", Value::Int(2));

    let child = root.extend(HashMap::from([("x".to_string(), Value::Int(10))]));
    assert_eq!(child.get("x"), Some(Value::Int(10)));
    assert_eq!(child.get("y"), Some(Value::Int(2)));
    assert_eq!(child.get("z"), None);
    assert_eq!(root.get("x"), Some(Value::Int(1)));
}

#[test]
fn define_writes_innermost() {
    let root = Environment::new();
    root.define("x", Value::Int(1));
    let child = root.extend(HashMap::new());

    child.define("x", Value::Int(5));
    assert_eq!(child.get("x"), Some(Value::Int(5)));
    assert_eq!(root.get("x"), Some(Value::Int(1)));

    root.define("x", Value::Int(7));
    assert_eq!(root.get("x"), Some(Value::Int(7)));
}

#[test]
fn clones_share_scopes() {
    let root = Environment::new();
    let captured = root.clone();
    root.define("late", Value::Str("seen".to_string()));
    assert_eq!(captured.get("late"), Some(Value::Str("seen".to_string())));
}

#[test]
fn assign_finds_nearest_binding() {
    let root = Environment::new();
    root.define("x", Value::Int(1));
    let child = root.extend(HashMap::new());

    assert_eq!(child.assign("x", Value::Int(2)), Ok(()));
    assert_eq!(root.get("x"), Some(Value::Int(2)));
    assert_eq!(
        child.assign("nope", Value::Int(0)),
        Err(RuntimeError::UnboundVariable("nope".to_string()))
    );
}
