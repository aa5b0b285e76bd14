use super::{Interpreter, Val};
use crate::error;
use crate::lang::Error;
use std::borrow::Cow;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// A host function callable from scripts. It receives the interpreter and
/// the evaluated arguments and returns exactly one value. Returning `Err`
/// aborts the script the same way an internal error does.
pub type Func = fn(&mut Interpreter, &Args) -> Result<Val>;

/// ## Function call arguments

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    vals: Vec<Val>,
}

impl Args {
    pub fn new(vals: Vec<Val>) -> Args {
        Args { vals }
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Val> {
        self.vals.iter()
    }

    pub fn get(&self, n: usize) -> Result<&Val> {
        match self.vals.get(n) {
            Some(val) => Ok(val),
            None => Err(error!(IllegalFunctionCall; "Too few parameters to function")),
        }
    }

    /// The n'th argument as a number.
    pub fn num(&self, n: usize) -> Result<i32> {
        Ok(self.get(n)?.number())
    }

    /// The n'th argument as a string.
    pub fn str(&self, n: usize) -> Result<Cow<'_, str>> {
        Ok(match self.get(n)? {
            Val::String(s) => Cow::Borrowed(s.as_str()),
            Val::Number(n) => Cow::Owned(n.to_string()),
        })
    }
}

impl From<Vec<Val>> for Args {
    fn from(vals: Vec<Val>) -> Args {
        Args::new(vals)
    }
}

/// ## Function table
///
/// Names are case-insensitive. A `None` entry disables a name, which is
/// how built-ins are switched off.

#[derive(Default)]
pub struct Functions {
    funcs: HashMap<String, Option<Func>>,
}

impl std::fmt::Debug for Functions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.funcs.keys().collect();
        names.sort();
        write!(f, "Functions {:?}", names)
    }
}

impl Functions {
    pub fn new() -> Functions {
        Functions::default()
    }

    /// A table with the built-in functions installed.
    pub fn with_builtins() -> Functions {
        let mut f = Functions::new();
        f.insert("val", Some(val));
        f.insert("str$", Some(str));
        f.insert("len", Some(len));
        f.insert("left$", Some(left));
        f.insert("right$", Some(right));
        f.insert("mid$", Some(mid));
        f.insert("ucase$", Some(ucase));
        f.insert("lcase$", Some(lcase));
        f.insert("trim$", Some(trim));
        f.insert("instr", Some(instr));
        f.insert("data", Some(data));
        f
    }

    pub fn insert(&mut self, name: &str, func: Option<Func>) {
        self.funcs.insert(name.to_ascii_lowercase(), func);
    }

    pub fn get(&self, name: &str) -> Option<Func> {
        self.funcs.get(name).copied().flatten()
    }
}

fn invalid(name: &str) -> Error {
    error!(IllegalFunctionCall; "Invalid parameters to {}()", name)
}

fn val(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    Ok(Val::Number(Val::parse_int(&args.str(0)?)))
}

fn str(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    Ok(Val::String(args.num(0)?.to_string()))
}

fn len(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    Ok(Val::Number(args.str(0)?.chars().count() as i32))
}

fn left(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    let s = args.str(0)?;
    let n = args.num(1)?;
    if n < 0 {
        return Err(invalid("LEFT$"));
    }
    Ok(Val::String(s.chars().take(n as usize).collect()))
}

fn right(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    let s = args.str(0)?;
    let n = args.num(1)?;
    if n < 0 {
        return Err(invalid("RIGHT$"));
    }
    let count = s.chars().count();
    let skip = count.saturating_sub(n as usize);
    Ok(Val::String(s.chars().skip(skip).collect()))
}

fn mid(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    let s = args.str(0)?;
    let p = args.num(1)? as i64 - 1;
    let q = args.num(2)? as i64;
    if q < p || p < 0 {
        return Err(invalid("MID$"));
    }
    Ok(Val::String(
        s.chars().skip(p as usize).take((q - p) as usize).collect(),
    ))
}

fn ucase(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    Ok(Val::String(args.str(0)?.to_ascii_uppercase()))
}

fn lcase(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    Ok(Val::String(args.str(0)?.to_ascii_lowercase()))
}

fn trim(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    Ok(Val::String(args.str(0)?.trim().to_string()))
}

fn instr(_m: &mut Interpreter, args: &Args) -> Result<Val> {
    let s = args.str(0)?;
    let find = args.str(1)?;
    Ok(Val::Number(match s.find(find.as_ref()) {
        Some(i) => s[..i].chars().count() as i32 + 1,
        None => 0,
    }))
}

fn is_array_name(name: &str) -> bool {
    let base = name.strip_suffix('$').unwrap_or(name);
    let mut chars = base.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// `DATA("list$", a, b, c)` stores `list$[1]`, `list$[2]` and `list$[3]`.
fn data(m: &mut Interpreter, args: &Args) -> Result<Val> {
    let name = match args.get(0) {
        Ok(Val::String(s)) => s.to_ascii_lowercase(),
        _ => {
            return Err(error!(IllegalFunctionCall;
                "DATA() must take at least 1 string parameter"))
        }
    };
    if !is_array_name(&name) {
        return Err(error!(IllegalFunctionCall;
            "DATA()'s first parameter must be a valid identifier"));
    }
    let strings = name.ends_with('$');
    for i in 1..args.len() {
        let value = if strings {
            Val::String(args.str(i)?.into_owned())
        } else {
            Val::Number(args.num(i)?)
        };
        m.set(&format!("{}[{}]", name, i), value);
    }
    Ok(Val::Number(args.len() as i32 - 1))
}
