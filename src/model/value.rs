use std::fmt;
use std::rc::Rc;

use crate::{Environment, Expression, RuntimeError};

pub type PrimitiveFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// Result of evaluating an [`Expression`].
///
/// Cloning is cheap: closures and primitives are shared behind `Rc`.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Closure(Rc<Closure>),
    Primitive(Primitive),
    /// What `define` and `set!` hand back; not meant to be inspected.
    Unspecified,
}

/// A user function: parameters, a single body expression and the scope
/// chain it was created in.
pub struct Closure {
    pub params: Vec<String>,
    pub body: Expression,
    pub env: Environment,
}

#[derive(Clone, Copy)]
pub struct Primitive {
    pub name: &'static str,
    pub func: PrimitiveFn,
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Closure(_) => "lambda",
            Value::Primitive(_) => "primitive",
            Value::Unspecified => "unspecified",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Primitive(a), Value::Primitive(b)) => a.name == b.name,
            (Value::Unspecified, Value::Unspecified) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part, so `3.0` does not print as `3`
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Closure(closure) => write!(f, "#<lambda ({})>", closure.params.join(" ")),
            Value::Primitive(p) => write!(f, "#<primitive {}>", p.name),
            Value::Unspecified => Ok(()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Unspecified => write!(f, "Unspecified"),
            // environments can be cyclic, so only the display form is printed
            other => write!(f, "{}", other),
        }
    }
}
