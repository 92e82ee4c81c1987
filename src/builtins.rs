//! The host primitives bound in every root environment.

use super::{Environment, Primitive, PrimitiveFn, RuntimeError, Value};

type Result<T> = std::result::Result<T, RuntimeError>;

const PRIMITIVES: [(&str, PrimitiveFn); 4] = [("+", add), ("*", mul), ("-", sub), ("=", equal)];

pub fn load_builtins(env: &Environment) {
    for (name, func) in PRIMITIVES {
        env.define(name, Value::Primitive(Primitive { name, func }));
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_value(primitive: &'static str, value: &Value) -> Result<Number> {
        match value {
            Value::Int(i) => Ok(Number::Int(*i)),
            Value::Float(f) => Ok(Number::Float(*f)),
            other => Err(RuntimeError::NotANumber {
                primitive,
                found: other.to_string(),
            }),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

// Left fold; stays integral until a float shows up.
fn fold(
    primitive: &'static str,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    let (first, rest) = args
        .split_first()
        .ok_or(RuntimeError::MissingArguments { primitive })?;

    let mut acc = Number::from_value(primitive, first)?;
    for arg in rest {
        acc = match (acc, Number::from_value(primitive, arg)?) {
            (Number::Int(a), Number::Int(b)) => {
                Number::Int(int_op(a, b).ok_or(RuntimeError::Overflow { primitive })?)
            }
            (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())),
        };
    }
    Ok(acc.into_value())
}

fn add(args: &[Value]) -> Result<Value> {
    fold("+", args, i64::checked_add, |a, b| a + b)
}

fn mul(args: &[Value]) -> Result<Value> {
    fold("*", args, i64::checked_mul, |a, b| a * b)
}

fn sub(args: &[Value]) -> Result<Value> {
    fold("-", args, i64::checked_sub, |a, b| a - b)
}

/// `#t` when every argument is numerically equal to the first; ints and
/// floats compare by value.
fn equal(args: &[Value]) -> Result<Value> {
    let numbers = args
        .iter()
        .map(|arg| Number::from_value("=", arg))
        .collect::<Result<Vec<_>>>()?;
    let (first, rest) = numbers
        .split_first()
        .ok_or(RuntimeError::MissingArguments { primitive: "=" })?;

    let all_equal = rest.iter().all(|number| match (first, number) {
        (Number::Int(a), Number::Int(b)) => a == b,
        (a, b) => a.as_f64() == b.as_f64(),
    });
    Ok(Value::Bool(all_equal))
}

#[cfg(test)]
fn call(name: &str, args: &[Value]) -> Result<Value> {
    let env = Environment::new();
    load_builtins(&env);
    match env.get(name) {
        Some(Value::Primitive(p)) => (p.func)(args),
        _ => panic!("{} is not a primitive", name),
    }
}

#[test]
fn arithmetic_folds_left() -> Result<()> {
    assert_eq!(call("+", &[Value::Int(1), Value::Int(2), Value::Int(3)])?, Value::Int(6));
    assert_eq!(call("*", &[Value::Int(2), Value::Int(3), Value::Int(4)])?, Value::Int(24));
    assert_eq!(call("-", &[Value::Int(10), Value::Int(3), Value::Int(2)])?, Value::Int(5));
    assert_eq!(call("+", &[Value::Int(1), Value::Float(0.5)])?, Value::Float(1.5));
    assert_eq!(call("*", &[Value::Float(0.5), Value::Int(4)])?, Value::Float(2.0));
    Ok(())
}

#[test]
fn single_argument_is_returned() -> Result<()> {
    assert_eq!(call("+", &[Value::Int(7)])?, Value::Int(7));
    assert_eq!(call("-", &[Value::Int(7)])?, Value::Int(7));
    assert_eq!(call("*", &[Value::Float(2.5)])?, Value::Float(2.5));
    assert_eq!(call("=", &[Value::Int(7)])?, Value::Bool(true));
    Ok(())
}

#[test]
fn equality() -> Result<()> {
    assert_eq!(call("=", &[Value::Int(2), Value::Int(2), Value::Int(2)])?, Value::Bool(true));
    assert_eq!(call("=", &[Value::Int(2), Value::Int(2), Value::Int(3)])?, Value::Bool(false));
    assert_eq!(call("=", &[Value::Int(1), Value::Float(1.0)])?, Value::Bool(true));
    assert_eq!(call("=", &[Value::Float(0.5), Value::Int(0)])?, Value::Bool(false));
    Ok(())
}

#[test]
fn equality_is_numeric_only() {
    assert_eq!(
        call("=", &[Value::Str("a".to_string()), Value::Str("a".to_string())]),
        Err(RuntimeError::NotANumber {
            primitive: "=",
            found: "\"a\"".to_string(),
        })
    );
    assert_eq!(
        call("=", &[Value::Int(1), Value::Bool(true)]),
        Err(RuntimeError::NotANumber {
            primitive: "=",
            found: "#t".to_string(),
        })
    );
    assert_eq!(
        call("=", &[Value::Str("x".to_string())]),
        Err(RuntimeError::NotANumber {
            primitive: "=",
            found: "\"x\"".to_string(),
        })
    );
}

#[test]
fn primitive_errors() {
    assert_eq!(call("+", &[]), Err(RuntimeError::MissingArguments { primitive: "+" }));
    assert_eq!(call("=", &[]), Err(RuntimeError::MissingArguments { primitive: "=" }));
    assert_eq!(
        call("*", &[Value::Int(2), Value::Str("x".to_string())]),
        Err(RuntimeError::NotANumber {
            primitive: "*",
            found: "\"x\"".to_string(),
        })
    );
    assert_eq!(
        call("+", &[Value::Int(i64::MAX), Value::Int(1)]),
        Err(RuntimeError::Overflow { primitive: "+" })
    );
}
