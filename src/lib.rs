//! A small Scheme-like interpreter.
//!
//! Source text goes through the [`Lexer`] and [`Parser`] into [`Expression`]
//! trees, which the [`Interpreter`] evaluates against a chain of scopes
//! ([`Environment`]). The language has `if`, `lambda`, `let`, `set!` and
//! `define`, plus the primitives `+`, `*`, `-` and `=`.
//!
//! ```
//! let interpreter = risplet::Interpreter::new();
//! let values = interpreter.run("(define (sq x) (* x x)) (sq 12)").unwrap();
//! assert_eq!(values[1], risplet::Value::Int(144));
//! ```

#[macro_use]
mod model;
pub use model::*;

mod config;
pub use config::*;

mod lexer;
pub use lexer::Lexer;

mod parser;
pub use parser::{classify_literal, parse, parse_with, Parser};

mod expression;
pub use expression::Expression;

mod environment;
pub use environment::Environment;

mod builtins;
pub use builtins::load_builtins;

mod interpreter;
pub use interpreter::Interpreter;
