#![allow(dead_code)]
use musl::{Args, Config, Error, Interpreter, Val};

fn print(m: &mut Interpreter, args: &Args) -> Result<Val, Error> {
    let mut line = String::new();
    for arg in args.iter() {
        line.push_str(&arg.to_string());
    }
    line.push('\n');
    if let Some(out) = m.data_mut::<String>() {
        out.push_str(&line);
    }
    Ok(Val::Number(args.len() as i32))
}

pub fn machine() -> Interpreter {
    machine_with(Config::default())
}

pub fn machine_with(config: Config) -> Interpreter {
    let mut m = Interpreter::with_config(config);
    m.add_func("print", Some(print));
    m.set_data(String::new());
    m
}

/// Printed output of the script followed by the error, if any.
pub fn exec(m: &mut Interpreter, script: &str) -> String {
    let mut s = match m.run(script) {
        Ok(()) => String::new(),
        Err(error) => format!("{}\n", error),
    };
    if let Some(out) = m.take_data::<String>() {
        s.insert_str(0, &out);
    }
    m.set_data(String::new());
    s
}

pub fn run(script: &str) -> String {
    exec(&mut machine(), script)
}
