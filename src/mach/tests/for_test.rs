use super::*;
use crate::lang::ErrorCode;
use crate::mach::Config;

#[test]
fn test_for_counts_up() {
    let mut m = machine();
    let s = run(&mut m, "for i = 1 to 3 do\nprint(i)\nnext\n");
    assert_eq!(s, "1\n2\n3\n");
    assert_eq!(m.get_num("i"), Some(3));
}

#[test]
fn test_for_counts_down_without_step() {
    let mut m = machine();
    assert_eq!(run(&mut m, "for i = 3 to 1 do\nprint(i)\nnext\n"), "3\n2\n1\n");
}

#[test]
fn test_for_explicit_step() {
    let mut m = machine();
    let s = run(&mut m, "for i = 0 to 10 step 5 do\nprint(i)\nnext\n");
    assert_eq!(s, "0\n5\n10\n");
}

#[test]
fn test_for_start_equals_stop() {
    let mut m = machine();
    assert_eq!(run(&mut m, "for i = 4 to 4 do\nprint(i)\nnext"), "4\n");
}

#[test]
fn test_for_bounds_reevaluated_each_pass() {
    let mut m = machine();
    let s = run(&mut m, "n = 3\nfor i = 1 to n do\nprint(i)\nn = 2\nnext\n");
    assert_eq!(s, "1\n2\n");
}

#[test]
fn test_nested_for() {
    let mut m = machine();
    let s = run(
        &mut m,
        "for i = 1 to 2 do\nfor j = 1 to 2 do\nprint(i, j)\nnext\nnext\n",
    );
    assert_eq!(s, "11\n12\n21\n22\n");
}

#[test]
fn test_suppressed_for_is_skipped() {
    let mut m = machine();
    let s = run(
        &mut m,
        "if 0 then for i = 1 to 3 do\nprint(i)\nnext\nprint(\"done\")\n",
    );
    assert_eq!(s, "done\n");
    assert_eq!(m.get("i"), None);
}

#[test]
fn test_next_then_colon() {
    let mut m = machine();
    let s = run(&mut m, "for i = 1 to 2 do\nprint(i)\nnext : print(\"end\")\n");
    assert_eq!(s, "1\n2\nend\n");
}

#[test]
fn test_for_stack_overflow() {
    let mut m = Interpreter::with_config(Config::default().max_for(2));
    let e = m
        .run("for a = 1 to 2 do\nfor b = 1 to 2 do\nfor c = 1 to 2 do\nnext\nnext\nnext\n")
        .unwrap_err();
    assert_eq!(e.code(), ErrorCode::StackOverflow);
    assert_eq!(e.msg(), "FOR stack overflow");
    assert_eq!(e.line(), Some(3));
}

#[test]
fn test_next_without_for() {
    let mut m = machine();
    assert_eq!(
        run(&mut m, "next\n"),
        "STACK UNDERFLOW IN 1; FOR stack underflow\n"
    );
    assert_eq!(m.error_text(), "next");
}

#[test]
fn test_do_must_end_line() {
    let mut m = machine();
    let e = m.run("for i = 1 to 2 do print(i)\nnext\n").unwrap_err();
    assert_eq!(e.msg(), "<LF> expected");
}

#[test]
fn test_suppressed_for_without_next() {
    let mut m = machine();
    let e = m.run("if 0 then for i = 1 to 2 do\nprint(i)\n").unwrap_err();
    assert_eq!(e.msg(), "NEXT expected");
}
