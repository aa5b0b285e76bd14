//! # MUSL
//!
//! A small BASIC-flavoured scripting language for embedding in Rust
//! programs. Scripts have labeled lines, GOTO and GOSUB, FOR loops, IF and
//! ON, and values that are either 32-bit integers or strings.
//!
//! The interpreter never builds a syntax tree. Each statement is parsed and
//! executed in one pass over the source text, and a jump is simply a move
//! of the source cursor.
//!
//! ```
//! use musl::{Args, Error, Interpreter, Val};
//!
//! fn twice(_m: &mut Interpreter, args: &Args) -> Result<Val, Error> {
//!     Ok(Val::Number(args.num(0)? * 2))
//! }
//!
//! let mut m = Interpreter::new();
//! m.add_func("twice", Some(twice));
//! m.set_num("x", 21);
//! m.run("y = twice(x)\nif y = 42 then msg$ = \"yes\"\n").unwrap();
//! assert_eq!(m.get_str("msg$").as_deref(), Some("yes"));
//! ```
//!
//! A failed run reports where it stopped:
//!
//! ```
//! let mut m = musl::Interpreter::new();
//! let error = m.run("a = 1\nb = a / 0\n").unwrap_err();
//! assert_eq!(error.line(), Some(2));
//! assert_eq!(m.error_msg(), "Divide by zero");
//! assert_eq!(m.error_text(), "0");
//! ```

pub mod lang;
pub mod mach;

pub use lang::{Error, ErrorCode};
pub use mach::{Args, Config, Func, Interpreter, Val};

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },
}

/// Read a script file into memory.
pub fn read_script<P: AsRef<Path>>(path: P) -> Result<String, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| LoadError::Encoding {
        path: path.to_path_buf(),
    })
}
