mod token;
pub use token::*;

mod located;
pub use located::*;

#[macro_use]
mod error;
pub use error::*;

mod value;
pub use value::*;
