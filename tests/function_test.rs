mod common;
use common::*;
use musl::{Args, Config, Error, ErrorCode, Interpreter, Val};

fn fail(_m: &mut Interpreter, args: &Args) -> Result<Val, Error> {
    Err(Error::thrown(format!("failed with {}", args.num(0)?)))
}

fn count(_m: &mut Interpreter, args: &Args) -> Result<Val, Error> {
    Ok(Val::Number(args.len() as i32))
}

#[test]
fn test_string_builtins() {
    assert_eq!(
        run("s$ = \"Hello World\"\nprint(left$(s$, 5), \"|\", right$(s$, 5), \"|\", mid$(s$, 7, 11))"),
        "Hello|World|World\n"
    );
    assert_eq!(run("print(len(\"four\"), ucase$(\"ab\"), lcase$(\"CD\"))"), "4ABcd\n");
    assert_eq!(run("print(\"[\" & trim$(\"  x  \") & \"]\")"), "[x]\n");
    assert_eq!(run("print(instr(\"banana\", \"nan\"), instr(\"banana\", \"q\"))"), "30\n");
    assert_eq!(run("print(str$(12) & str$(-3), val(\" 42x\") + 1)"), "12-343\n");
}

#[test]
fn test_data() {
    assert_eq!(
        run("n = data(\"list\", 10, 20)\nprint(n, \" \", list[1] + list[2])"),
        "2 30\n"
    );
    assert_eq!(
        run("data(\"names$\", \"ann\", 7)\nprint(names$[1] & names$[2])"),
        "ann7\n"
    );
    let mut m = machine();
    let e = m.run("data(1)\n").unwrap_err();
    assert_eq!(e.msg(), "DATA() must take at least 1 string parameter");
}

#[test]
fn test_host_function_error() {
    let mut m = machine();
    m.add_func("fail", Some(fail));
    let s = exec(&mut m, "print(1)\nx = fail(7)\nprint(2)\n");
    assert_eq!(s, "1\nERROR IN 2; failed with 7\n");
    assert_eq!(m.last_error().map(|e| e.code()), Some(ErrorCode::Thrown));
}

#[test]
fn test_function_not_called_when_suppressed() {
    let mut m = machine();
    m.add_func("fail", Some(fail));
    assert_eq!(exec(&mut m, "if 0 then fail(1)\nprint(\"ok\")"), "ok\n");
}

#[test]
fn test_undefined_and_disabled_functions() {
    let mut m = machine();
    let e = m.run("foo(1)\n").unwrap_err();
    assert_eq!(e.code(), ErrorCode::UndefinedFunction);
    assert_eq!(e.msg(), "Call to undefined function foo()");
    m.add_func("LEN", None);
    let e = m.run("x = len(\"abc\")\n").unwrap_err();
    assert_eq!(e.msg(), "Call to undefined function len()");
}

#[test]
fn test_replace_function() {
    let mut m = machine();
    m.add_func("len", Some(count));
    assert_eq!(exec(&mut m, "print(len(1, 2, 3))"), "3\n");
}

#[test]
fn test_parameter_limit() {
    let mut m = machine_with(Config::default().max_params(2));
    let e = m.run("print(1, 2, 3)\n").unwrap_err();
    assert_eq!(e.msg(), "Too many parameters to function print");
    assert_eq!(exec(&mut m, "print(1, 2)"), "12\n");
}

#[test]
fn test_empty_arguments() {
    let mut m = machine();
    m.add_func("count", Some(count));
    assert_eq!(exec(&mut m, "print(count())"), "0\n");
    let e = m.run("x = len()\n").unwrap_err();
    assert_eq!(e.msg(), "Too few parameters to function");
}
