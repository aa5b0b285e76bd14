/*!
# Rust Language Module

This Rust module provides lexical analysis and error reporting for MUSL.
There is no parser here: the machine parses and executes in one pass,
pulling tokens from a [`Lexer`](lex::Lexer) cursor.

*/

#[macro_use]
mod error;
pub mod lex;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::{Cursor, Lexer};
pub use token::Token;
