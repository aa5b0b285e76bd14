use crate::lang::Error;
use crate::mach::{Args, Interpreter, Val};

mod for_test;

fn print(m: &mut Interpreter, args: &Args) -> Result<Val, Error> {
    let mut line = String::new();
    for arg in args.iter() {
        line.push_str(&arg.to_string());
    }
    line.push('\n');
    if let Some(out) = m.data_mut::<String>() {
        out.push_str(&line);
    }
    Ok(Val::Number(0))
}

fn machine() -> Interpreter {
    let mut m = Interpreter::new();
    m.add_func("print", Some(print));
    m.set_data(String::new());
    m
}

fn run(m: &mut Interpreter, script: &str) -> String {
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
