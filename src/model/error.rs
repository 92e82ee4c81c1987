use thiserror::Error;

use super::{Located, ToLocated};

macro_rules! located_error {
    ($arg:expr, $loc:expr) => {
        Err($arg.with_locate($loc))
    };
}

/// Why a piece of source text could not be turned into expressions.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum SyntaxErrorKind {
    #[error("expected '(' but found `{0}`")]
    ExpectedOpenParen(String),
    #[error("expected ')' before end of input")]
    UnterminatedList,
    #[error("unterminated string literal `{0}`")]
    UnterminatedString(String),
    #[error("unparsed tokens: {}", .0.join(" "))]
    UnparsedTokens(Vec<String>),
    #[error("integer literal `{0}` does not fit in 64 bits")]
    IntegerOutOfRange(String),
    #[error("lists nested deeper than {0}")]
    TooDeeplyNested(usize),
}

impl ToLocated for SyntaxErrorKind {}

pub type SyntaxError = Located<SyntaxErrorKind>;

#[derive(Error, PartialEq, Debug, Clone)]
pub enum RuntimeError {
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),
    #[error("expected {expected} argument(s) but got {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("`{0}` is not callable")]
    NotCallable(String),
    #[error("malformed `{form}`: {reason}")]
    MalformedForm {
        form: &'static str,
        reason: &'static str,
    },
    #[error("`{primitive}` needs at least one argument")]
    MissingArguments { primitive: &'static str },
    #[error("`{primitive}` expects numbers but got `{found}`")]
    NotANumber {
        primitive: &'static str,
        found: String,
    },
    #[error("integer overflow in `{primitive}`")]
    Overflow { primitive: &'static str },
    #[error("call depth exceeded {0}")]
    CallDepthExceeded(usize),
    #[error("evaluation depth exceeded {0}")]
    EvalDepthExceeded(usize),
}

impl RuntimeError {
    pub(crate) fn malformed(form: &'static str, reason: &'static str) -> Self {
        RuntimeError::MalformedForm { form, reason }
    }
}

/// Anything [`Interpreter::run`](crate::Interpreter::run) can fail with.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] Located<SyntaxErrorKind>),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}
