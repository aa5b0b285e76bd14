//! # MUSL
//!
//! Runs MUSL script files from the command line.
//!

mod term;

fn main() {
    std::process::exit(term::main());
}
