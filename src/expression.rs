use std::fmt;

/// A parsed S-expression. Trees are immutable once the parser hands them out.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Vec<Expression>),
}

impl Expression {
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expression::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expression]> {
        match self {
            Expression::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Int(i) => write!(f, "{}", i),
            Expression::Float(x) => write!(f, "{:?}", x),
            Expression::Str(s) => write!(f, "\"{}\"", s),
            Expression::Symbol(name) => write!(f, "{}", name),
            Expression::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
