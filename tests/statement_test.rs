mod common;
use common::*;
use musl::{Config, ErrorCode};

#[test]
fn test_if_false_does_not_execute() {
    assert_eq!(run("if 0 then x = 1\nprint(x)"), "0\n");
    assert_eq!(run("if 0 then x$ = \"set\"\nprint(x$ & \".\")"), ".\n");
}

#[test]
fn test_nested_if_composes_by_and() {
    assert_eq!(run("if 1 then if 0 then print(\"no\")\nprint(\"end\")"), "end\n");
    assert_eq!(run("if 0 then if 1 then print(\"no\")\nprint(\"end\")"), "end\n");
    assert_eq!(run("if 1 then if 1 then print(\"yes\")"), "yes\n");
}

#[test]
fn test_if_then_newline() {
    assert_eq!(run("if 1 then\n\nprint(\"next line\")\n"), "next line\n");
}

#[test]
fn test_suppressed_statements_are_still_checked() {
    let mut m = machine();
    let e = m.run("if 0 then goto nowhere\n").unwrap_err();
    assert_eq!(e.code(), ErrorCode::UndefinedLabel);
    assert_eq!(e.msg(), "GOTO/GOSUB to undefined label 'nowhere'");
}

#[test]
fn test_goto() {
    assert_eq!(
        run("goto skip\nprint(\"no\")\nskip: print(\"yes\")"),
        "yes\n"
    );
    assert_eq!(
        run("i = 0\n10 i = i + 1\nif i < 3 then goto 10\nprint(i)"),
        "3\n"
    );
}

#[test]
fn test_goto_undefined_label() {
    assert_eq!(
        run("goto 99\n"),
        "UNDEFINED LABEL IN 1; GOTO/GOSUB to undefined label '99'\n"
    );
}

#[test]
fn test_labels_out_of_sequence() {
    let mut m = machine();
    let s = exec(&mut m, "20 print(1)\n10 print(2)\n");
    assert_eq!(s, "SYNTAX ERROR IN 2; Label 10 out of sequence\n");
}

#[test]
fn test_on_goto() {
    let script = "on n goto a, b\nprint(\"none\")\nend\na: print(\"a\")\nend\nb: print(\"b\")\n";
    let mut m = machine();
    m.set_num("n", 1);
    assert_eq!(exec(&mut m, script), "b\n");
    m.set_num("n", 0);
    assert_eq!(exec(&mut m, script), "a\n");
    m.set_num("n", 5);
    assert_eq!(exec(&mut m, script), "none\n");
    m.set_num("n", -1);
    assert_eq!(exec(&mut m, script), "none\n");
}

#[test]
fn test_on_gosub() {
    assert_eq!(
        run("on 0 gosub s\nprint(\"back\")\nend\ns: print(\"sub\")\nreturn"),
        "sub\nback\n"
    );
}

#[test]
fn test_on_only_resolves_selected_label() {
    assert_eq!(run("on 0 goto a, missing\nend\na: print(\"a\")"), "a\n");
    let mut m = machine();
    let e = m.run("on 1 goto a, missing\nend\na: print(\"a\")").unwrap_err();
    assert_eq!(e.code(), ErrorCode::UndefinedLabel);
    let e = m.run("on 1 print(1)\n").unwrap_err();
    assert_eq!(e.msg(), "GOTO or GOSUB expected");
}

#[test]
fn test_colon_separated() {
    assert_eq!(run("a = 1 : b = 2 : print(a + b)"), "3\n");
    assert_eq!(run("a = 1 :\n\nprint(a)"), "1\n");
    let mut m = machine();
    let e = m.run("a = 1 b = 2\n").unwrap_err();
    assert_eq!(e.msg(), "':' or <LF> expected");
    assert_eq!(m.error_text(), "b = 2");
}

#[test]
fn test_let() {
    assert_eq!(run("let a = 4\nprint(a)"), "4\n");
    let mut m = machine();
    assert_eq!(m.run("let print(1)\n").unwrap_err().msg(), "'=' expected");
    assert_eq!(m.run("let 5 = 1\n").unwrap_err().msg(), "Identifier expected");
    assert_eq!(m.run("= 1\n").unwrap_err().msg(), "Statement expected");
}

#[test]
fn test_comments_and_continuation() {
    assert_eq!(run("a = 1 + \\\n 2 # comment\nprint(a) # done\n"), "3\n");
    let mut m = machine();
    let e = m.run("a = 1 \\ 2\n").unwrap_err();
    assert_eq!(e.msg(), "Bad '\\' at end of line");
}

#[test]
fn test_end() {
    assert_eq!(run("print(1)\nend\nprint(2)"), "1\n");
    assert_eq!(run("if 1 then end\nprint(2)"), "");
    assert_eq!(run("if 0 then end\nprint(2)"), "2\n");
}

#[test]
fn test_strict_variables() {
    let mut m = machine_with(Config::default().strict_variables(true));
    let e = m.run("print(y)\n").unwrap_err();
    assert_eq!(e.code(), ErrorCode::UndefinedVariable);
    assert_eq!(e.msg(), "Read from undefined variable 'y'");
    assert_eq!(exec(&mut m, "if 0 then print(y)\ny = 2\nprint(y)"), "2\n");
}

#[test]
fn test_lexical_error_stops_before_running() {
    let mut m = machine();
    let s = exec(&mut m, "print(1)\nb$ = \"oops\n");
    assert_eq!(s, "SYNTAX ERROR IN 2; Unterminated string\n");
    assert_eq!(exec(&mut m, "a = 1 @ 2\n"), "SYNTAX ERROR IN 1; Unknown token '@'\n");
    let long = format!("print(1)\n{} = 1\n", "a".repeat(100));
    assert_eq!(exec(&mut m, &long), "SYNTAX ERROR IN 2; Token too long\n");
}

#[test]
fn test_string_variable_is_not_a_label() {
    let mut m = machine();
    assert_eq!(m.run("x$: y = 1\n").unwrap_err().msg(), "'=' expected");
    assert_eq!(m.run("goto x$\n").unwrap_err().msg(), "Label expected");
}
