extern crate ansi_term;
extern crate ctrlc;
use ansi_term::Style;
use clap::Parser;
use musl::{Config, Error, Interpreter, Val};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod host;
mod linefeed;

#[derive(Parser, Debug)]
#[command(name = "musl")]
#[command(version, about = "Run MUSL scripts", long_about = None)]
struct Cli {
    /// Scripts to run, in order, on one interpreter
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Make reading an undefined variable an error
    #[arg(long)]
    strict: bool,

    /// GOSUB nesting limit
    #[arg(long, value_name = "N", default_value_t = 20)]
    max_gosub: usize,

    /// FOR nesting limit
    #[arg(long, value_name = "N", default_value_t = 5)]
    max_for: usize,

    /// Set a variable before running, e.g. --set name$=world
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, Val)>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assignment(s: &str) -> Result<(String, Val), String> {
    let (name, value) = match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => (name.trim(), value),
        _ => return Err(format!("expected NAME=VALUE, got '{}'", s)),
    };
    let value = match value.parse::<i32>() {
        Ok(n) => Val::Number(n),
        Err(_) => Val::String(value.to_string()),
    };
    Ok((name.to_string(), value))
}

pub fn main() -> i32 {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = Config::default()
        .max_gosub(cli.max_gosub)
        .max_for(cli.max_for)
        .strict_variables(cli.strict);
    let mut m = Interpreter::with_config(config);
    let interrupted = m.interrupt_handle();
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        warn!(%error, "unable to install Ctrl-C handler");
    }
    host::install(&mut m, interrupted);
    for (name, value) in cli.set {
        m.set(&name, value);
    }

    for path in &cli.files {
        let script = match musl::read_script(path) {
            Ok(script) => script,
            Err(error) => {
                eprintln!("ERROR: {}", error);
                return 1;
            }
        };
        debug!(path = %path.display(), "running");
        if let Err(error) = m.run(&script) {
            report(&error);
            return 1;
        }
    }
    0
}

fn report(error: &Error) {
    let text = format!(
        "ERROR:Line {}: {}:\n>> {}",
        error.line().unwrap_or(0),
        error.msg(),
        error.text()
    );
    if std::io::stderr().is_terminal() {
        eprintln!("{}", Style::new().bold().paint(text));
    } else {
        eprintln!("{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("count=12").unwrap(),
            ("count".to_string(), Val::Number(12))
        );
        assert_eq!(
            parse_assignment("name$=a=b").unwrap(),
            ("name$".to_string(), Val::from("a=b"))
        );
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("novalue").is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from(["musl", "--strict", "--max-for", "9", "--set", "x=1", "a.mu"]);
        assert!(cli.strict);
        assert_eq!(cli.max_for, 9);
        assert_eq!(cli.max_gosub, 20);
        assert_eq!(cli.set.len(), 1);
        assert_eq!(cli.files, vec![PathBuf::from("a.mu")]);
    }
}
