use super::linefeed::Console;
use musl::{Args, Error, Interpreter, Val};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

const NUM_FILES: usize = 10;

/// Most submatches REGEX() stores in `_m$[]`.
const MAX_MATCHES: usize = 10;

enum Handle {
    Read(BufReader<File>),
    Write(File),
}

/// Host context kept in the interpreter's user data.
pub struct Host {
    files: Vec<Option<Handle>>,
    rng: StdRng,
    console: Console,
}

impl Host {
    pub fn new(interrupted: Arc<AtomicBool>) -> Host {
        Host {
            files: (0..NUM_FILES).map(|_| None).collect(),
            rng: StdRng::seed_from_u64(clock_seed()),
            console: Console::new(interrupted),
        }
    }

    fn handle(&mut self, args: &Args, name: &str) -> Result<&mut Handle> {
        let index = args.num(0)?;
        let slot = match usize::try_from(index) {
            Ok(i) => self.files.get_mut(i),
            Err(_) => None,
        };
        match slot {
            Some(Some(handle)) => Ok(handle),
            _ => Err(Error::thrown(format!("Invalid file handle in {}()", name))),
        }
    }
}

fn clock_seed() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

fn host(m: &mut Interpreter) -> Result<&mut Host> {
    match m.data_mut::<Host>() {
        Some(host) => Ok(host),
        None => Err(Error::thrown("Host context missing")),
    }
}

/// Register the command line host functions.
pub fn install(m: &mut Interpreter, interrupted: Arc<AtomicBool>) {
    m.set_data(Host::new(interrupted));
    m.add_func("print", Some(print));
    m.add_func("input$", Some(input));
    m.add_func("open", Some(open));
    m.add_func("close", Some(close));
    m.add_func("eof", Some(eof));
    m.add_func("read$", Some(read));
    m.add_func("write", Some(write));
    m.add_func("randomize", Some(randomize));
    m.add_func("random", Some(random));
    m.add_func("regex", Some(regex_match));
    m.add_func("call", Some(call));
    m.add_func("halt", Some(halt));
}

fn io_error(context: &str, error: std::io::Error) -> Error {
    Error::thrown(format!("{}: {}", context, error))
}

/// PRINT(exp1, exp2, ...) prints its arguments and a newline.
fn print(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    let mut line = String::new();
    for arg in args.iter() {
        line.push_str(&arg.to_string());
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", line).map_err(|e| io_error("PRINT()", e))?;
    Ok(Val::Number(args.len() as i32))
}

/// INPUT$([prompt]) reads a line from the keyboard.
fn input(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let prompt = if args.is_empty() {
        "> ".to_string()
    } else {
        args.str(0)?.into_owned()
    };
    let line = host(m)?
        .console
        .read_line(&prompt)
        .map_err(|e| io_error("INPUT$()", e))?;
    Ok(Val::String(line))
}

/// OPEN(path, mode) with mode "r", "w" or "a"; returns a file number.
fn open(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let path = args.str(0)?.into_owned();
    let mode = args.str(1)?.into_owned();
    let host = host(m)?;
    let index = match host.files.iter().position(Option::is_none) {
        Some(index) => index,
        None => return Err(Error::thrown("Too many open files")),
    };
    let handle = match mode.as_str() {
        "r" => File::open(&path).map(|f| Handle::Read(BufReader::new(f))),
        "w" => File::create(&path).map(Handle::Write),
        "a" => OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map(Handle::Write),
        _ => return Err(Error::thrown("Unable to OPEN() file")),
    };
    match handle {
        Ok(handle) => {
            host.files[index] = Some(handle);
            Ok(Val::Number(index as i32))
        }
        Err(_) => Err(Error::thrown("Unable to OPEN() file")),
    }
}

fn close(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let host = host(m)?;
    host.handle(args, "CLOSE")?;
    let index = args.num(0)? as usize;
    if let Some(Handle::Write(mut file)) = host.files[index].take() {
        file.flush().map_err(|e| io_error("CLOSE()", e))?;
    }
    Ok(Val::Number(0))
}

/// EOF(f) is 1 once a file opened for reading has nothing left.
fn eof(m: &mut Interpreter, args: &Args) -> Result<Val> {
    match host(m)?.handle(args, "EOF")? {
        Handle::Read(reader) => {
            let buf = reader.fill_buf().map_err(|e| io_error("EOF()", e))?;
            Ok(Val::from(buf.is_empty()))
        }
        Handle::Write(_) => Ok(Val::Number(0)),
    }
}

/// READ$(f) reads one line without its line ending.
fn read(m: &mut Interpreter, args: &Args) -> Result<Val> {
    match host(m)?.handle(args, "READ$")? {
        Handle::Read(reader) => {
            let mut line = String::new();
            if reader.read_line(&mut line).is_err() {
                return Err(Error::thrown("Couldn't READ$() from file"));
            }
            Ok(Val::String(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
        }
        Handle::Write(_) => Err(Error::thrown("Couldn't READ$() from file")),
    }
}

/// WRITE(f, par1, par2, ...) writes its parameters separated by spaces.
fn write(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let line = args
        .iter()
        .skip(1)
        .map(Val::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    match host(m)?.handle(args, "WRITE")? {
        Handle::Write(file) => {
            writeln!(file, "{}", line).map_err(|e| io_error("WRITE()", e))?;
            Ok(Val::Number(0))
        }
        Handle::Read(_) => Err(Error::thrown("Couldn't WRITE() to file")),
    }
}

/// RANDOMIZE([seed])
fn randomize(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let seed = if args.is_empty() {
        clock_seed()
    } else {
        args.num(0)? as u64
    };
    host(m)?.rng = StdRng::seed_from_u64(seed);
    Ok(Val::Number(0))
}

/// RANDOM() any non-negative number, RANDOM(n) in 1..=n, RANDOM(n, m) in n..=m.
fn random(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let (low, high) = match args.len() {
        0 => (0, i32::MAX),
        1 => (1, args.num(0)?),
        _ => (args.num(0)?, args.num(1)?),
    };
    if high < low {
        return Err(Error::thrown("Invalid parameters to RANDOM()"));
    }
    Ok(Val::Number(host(m)?.rng.gen_range(low..=high)))
}

/// REGEX(pattern$, string$) stores the match and its groups in `_m$[0]`,
/// `_m$[1]`, ... and returns how many were stored, or 0 for no match.
fn regex_match(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let re = match Regex::new(&args.str(0)?) {
        Ok(re) => re,
        Err(e) => return Err(Error::thrown(format!("In REGEX(): {}", e))),
    };
    let subject = args.str(1)?;
    let captures = match re.captures(&subject) {
        Some(captures) => captures,
        None => return Ok(Val::Number(0)),
    };
    let mut count = 0;
    for group in captures.iter().take(MAX_MATCHES) {
        match group {
            Some(group) => m.set_str(&format!("_m$[{}]", count), group.as_str()),
            None => break,
        }
        count += 1;
    }
    Ok(Val::Number(count))
}

/// CALL(label$) is GOSUB label from a host function.
fn call(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let label = args.str(0)?.into_owned();
    m.gosub(&label)?;
    Ok(Val::Number(1))
}

fn halt(m: &mut Interpreter, _args: &Args) -> Result<Val> {
    m.halt();
    Ok(Val::Number(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Interpreter {
        let mut m = Interpreter::new();
        install(&mut m, Arc::new(AtomicBool::new(false)));
        m
    }

    #[test]
    fn test_regex_fills_matches() {
        let mut m = machine();
        m.run("n = regex(\"([a-z]+)-([0-9]+)\", \"id: abc-42\")\n")
            .unwrap();
        assert_eq!(m.get_num("n"), Some(3));
        assert_eq!(m.get_str("_m$[0]").as_deref(), Some("abc-42"));
        assert_eq!(m.get_str("_m$[2]").as_deref(), Some("42"));
        m.run("n = regex(\"x+\", \"abc\")\n").unwrap();
        assert_eq!(m.get_num("n"), Some(0));
    }

    #[test]
    fn test_random_is_seeded() {
        let mut m = machine();
        m.run("randomize(7)\na = random(6)\nrandomize(7)\nb = random(6)\nc = random(3, 3)\n")
            .unwrap();
        assert_eq!(m.get_num("a"), m.get_num("b"));
        let a = m.get_num("a").unwrap();
        assert!((1..=6).contains(&a));
        assert_eq!(m.get_num("c"), Some(3));
        let e = m.run("x = random(5, 1)\n").unwrap_err();
        assert_eq!(e.msg(), "Invalid parameters to RANDOM()");
    }

    #[test]
    fn test_files() {
        let path = std::env::temp_dir().join(format!("musl-host-{}.txt", std::process::id()));
        let mut m = machine();
        m.set_str("path$", path.to_string_lossy().into_owned());
        m.run(
            "f = open(path$, \"w\")\nwrite(f, \"a\", 1)\nclose(f)\n\
             f = open(path$, \"r\")\nl$ = read$(f)\ne = eof(f)\nclose(f)\n",
        )
        .unwrap();
        assert_eq!(m.get_str("l$").as_deref(), Some("a 1"));
        assert_eq!(m.get_num("e"), Some(1));
        let e = m.run("close(3)\n").unwrap_err();
        assert_eq!(e.msg(), "Invalid file handle in CLOSE()");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_call_propagates_errors() {
        let mut m = machine();
        let e = m
            .run("call(\"sub\")\nend\nsub: x = 1 / 0\nreturn\n")
            .unwrap_err();
        assert_eq!(e.msg(), "Divide by zero");
        assert_eq!(e.line(), Some(3));
    }
}
