/*!
## Rust Machine Module

This Rust module is the runtime for MUSL. There is no compiler: the
[`Interpreter`] walks the script text with a lexer cursor, executing each
statement as it is parsed.

*/

pub type Address = usize;

mod config;
mod function;
mod label;
mod runtime;
mod stack;
mod val;
mod var;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use function::{Args, Func, Functions};
pub use label::Labels;
pub use runtime::Interpreter;
pub use stack::Stack;
pub use val::Val;
pub use var::{flat_name, Var};
