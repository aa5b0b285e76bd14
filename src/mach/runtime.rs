use super::function::{Args, Func, Functions};
use super::label::{is_label_name, label_key, parse_number, Labels};
use super::var::{element_name, flat_name};
use super::{Address, Config, Stack, Val, Var};
use crate::error;
use crate::lang::token::{Operator, Word};
use crate::lang::{Error, Lexer, Token};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

type Result<T> = std::result::Result<T, Error>;

/// What the program loop does after a statement.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Jump(Address),
    Stop,
}

/// ## MUSL interpreter
///
/// Scripts are parsed and executed in the same pass. The lexer cursor is
/// the instruction pointer: every jump, call and loop repeat is a `seek`.
/// While `active` is false statements are still parsed but have no effect,
/// which is how a false IF skips its consequent.
///
/// ```
/// use musl::Interpreter;
///
/// let mut m = Interpreter::new();
/// m.run("total = 0\nfor i = 1 to 4 do\ntotal = total + i\nnext\n").unwrap();
/// assert_eq!(m.get_num("total"), Some(10));
/// ```
pub struct Interpreter {
    config: Config,
    lex: Lexer,
    vars: Var,
    labels: Labels,
    functions: Functions,
    gosub: Stack<Option<Address>>,
    for_stack: Stack<Address>,
    active: bool,
    error: Option<Error>,
    error_line: Option<usize>,
    data: Option<Box<dyn Any>>,
    interrupted: Arc<AtomicBool>,
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Interpreter {
        Interpreter {
            lex: Lexer::new("", config.token_len()),
            vars: Var::new(),
            labels: Labels::new(),
            functions: Functions::with_builtins(),
            gosub: Stack::new("GOSUB", config.gosub_depth()),
            for_stack: Stack::new("FOR", config.for_depth()),
            active: true,
            error: None,
            error_line: None,
            data: None,
            interrupted: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a complete script. Variables and functions survive the run,
    /// labels and stacks do not.
    pub fn run(&mut self, script: &str) -> Result<()> {
        self.lex = Lexer::new(script, self.config.token_len());
        self.active = true;
        self.gosub.clear();
        self.for_stack.clear();
        self.labels.clear();
        self.error = None;
        self.error_line = None;
        debug!(bytes = script.len(), "run started");
        let result = match self.labels.scan(&mut self.lex) {
            Ok(()) => {
                debug!(labels = self.labels.len(), "labels scanned");
                self.program()
            }
            Err(e) => Err(e),
        };
        self.labels.clear();
        match result {
            Ok(()) => {
                debug!("run finished");
                Ok(())
            }
            Err(error) => {
                let error = self.locate(error);
                debug!(%error, "run failed");
                self.error_line = error.line();
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Attach the line and source text of the failing token. Errors that
    /// already carry a location came from a nested `gosub` and keep it.
    fn locate(&mut self, error: Error) -> Error {
        if error.line().is_some() {
            return error;
        }
        self.lex.reset();
        error.in_line(self.lex.line_number(), &self.lex.snippet())
    }

    /// Call a labeled subroutine from a host function. The subroutine runs
    /// until its RETURN (or END, or a halt) and then the caller's position
    /// is restored. An error inside the subroutine is returned here and
    /// recorded for `error_msg`, without ending the outer script.
    pub fn gosub(&mut self, label: &str) -> Result<()> {
        debug!(label, "gosub from host");
        let result = self.gosub_inner(label);
        if let Err(error) = &result {
            debug!(%error, "gosub from host failed");
            self.error = Some(error.clone());
        }
        result
    }

    fn gosub_inner(&mut self, label: &str) -> Result<()> {
        let label = label.trim();
        let key = match label.parse::<i32>() {
            Ok(n) => n.to_string(),
            Err(_) => label.to_ascii_lowercase(),
        };
        let addr = match self.labels.get(&key) {
            Some(addr) => addr,
            None => return Err(error!(UndefinedLabel; "GOSUB to undefined label '{}'", label)),
        };
        self.gosub.overflow_check()?;
        let cursor = self.lex.cursor();
        let gosub_depth = self.gosub.len();
        let for_depth = self.for_stack.len();
        let active = self.active;
        self.gosub.push(None)?;
        self.lex.seek(addr);
        let result = match self.program() {
            Ok(()) => Ok(()),
            Err(error) => Err(self.locate(error)),
        };
        self.gosub.truncate(gosub_depth);
        self.for_stack.truncate(for_depth);
        self.active = active;
        self.lex.restore(cursor);
        result
    }

    /// Stop the script as if END had been reached.
    pub fn halt(&mut self) {
        debug!("halt requested");
        self.lex.halt();
    }

    /// Setting the flag stops the running script before its next statement.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Message of the most recent failure, empty if there was none.
    pub fn error_msg(&self) -> &str {
        match &self.error {
            Some(error) => error.msg(),
            None => "",
        }
    }

    /// Source text at the most recent failure.
    pub fn error_text(&self) -> &str {
        match &self.error {
            Some(error) => error.text(),
            None => "",
        }
    }

    /// 1-based line of the cursor. After a failed run this is the line the
    /// error was reported at, even when it came from a nested `gosub`.
    pub fn cur_line(&self) -> usize {
        match self.error_line {
            Some(line) => line,
            None => self.lex.line_number(),
        }
    }

    /// Register, replace or (with `None`) disable a function.
    pub fn add_func(&mut self, name: &str, func: Option<Func>) {
        self.functions.insert(name, func);
    }

    pub fn get(&self, name: &str) -> Option<Val> {
        self.vars.get(&flat_name(name)).cloned()
    }

    pub fn get_num(&self, name: &str) -> Option<i32> {
        self.get(name).map(|v| v.number())
    }

    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(Val::into_string)
    }

    pub fn set(&mut self, name: &str, value: Val) {
        self.vars.store(&flat_name(name), value);
    }

    pub fn set_num(&mut self, name: &str, value: i32) {
        self.set(name, Val::Number(value));
    }

    pub fn set_str<S: Into<String>>(&mut self, name: &str, value: S) {
        self.set(name, Val::String(value.into()));
    }

    /// Store host context for host functions to recover with `data`.
    pub fn set_data<T: Any>(&mut self, data: T) {
        self.data = Some(Box::new(data));
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref().and_then(|d| d.downcast_ref())
    }

    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.as_mut().and_then(|d| d.downcast_mut())
    }

    pub fn take_data<T: Any>(&mut self) -> Option<T> {
        match self.data.take()?.downcast::<T>() {
            Ok(data) => Some(*data),
            Err(data) => {
                self.data = Some(data);
                None
            }
        }
    }

    fn program(&mut self) -> Result<()> {
        let mut line_start = true;
        loop {
            if self.interrupted.swap(false, Ordering::SeqCst) {
                return Err(error!(Interrupted));
            }
            let t = self.lex.next()?;
            if matches!(t, Token::End | Token::Word(Word::End)) {
                break;
            }
            if line_start || t == Token::LineFeed {
                let t = if line_start { t } else { self.lex.next()? };
                match t {
                    Token::Number(_) => {}
                    Token::Ident(name) if is_label_name(&name) => {
                        let start = self.lex.mark();
                        if self.lex.next()? != Token::Colon {
                            self.lex.seek(start);
                        }
                    }
                    _ => self.lex.reset(),
                }
                line_start = false;
            } else if t == Token::Colon {
                continue;
            } else {
                self.lex.reset();
                match self.statement()? {
                    Flow::Continue => {}
                    Flow::Jump(addr) => self.lex.seek(addr),
                    Flow::Stop => break,
                }
            }
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<Flow> {
        let t = self.lex.next()?;
        match t {
            Token::Ident(_) | Token::Word(Word::Let) => self.assignment(t),
            Token::Word(Word::If) => self.if_then(),
            Token::Word(Word::Goto) => self.goto(false),
            Token::Word(Word::Gosub) => self.goto(true),
            Token::Word(Word::Return) => self.ret(),
            Token::Word(Word::On) => self.on(),
            Token::Word(Word::For) => self.for_do(),
            Token::Word(Word::Next) => self.next(),
            Token::Word(Word::End) | Token::End => {
                if self.active {
                    self.lex.reset();
                    Ok(Flow::Stop)
                } else {
                    self.separator()
                }
            }
            _ => Err(error!(SyntaxError; "Statement expected")),
        }
    }

    /// `:` chains another statement, otherwise the line must end here.
    fn separator(&mut self) -> Result<Flow> {
        let t = self.lex.next()?;
        if t == Token::Colon {
            while self.lex.next()? == Token::LineFeed {}
            self.lex.reset();
            return self.statement();
        }
        if !t.is_terminator() {
            return Err(error!(SyntaxError; "':' or <LF> expected"));
        }
        self.lex.reset();
        Ok(Flow::Continue)
    }

    fn assignment(&mut self, first: Token) -> Result<Flow> {
        let (name, has_let) = match first {
            Token::Ident(name) => (name, false),
            _ => match self.lex.next()? {
                Token::Ident(name) => (name, true),
                _ => return Err(error!(SyntaxError; "Identifier expected")),
            },
        };
        let (name, indexed) = match self.lex.next()? {
            Token::LBracket => (self.index(&name)?, true),
            _ => {
                self.lex.reset();
                (name, false)
            }
        };
        match self.lex.next()? {
            Token::Operator(Operator::Equal) => {
                let value = self.expr()?;
                if self.active {
                    self.vars.store(&name, value);
                }
            }
            Token::LParen if !has_let && !indexed => {
                self.call(&name)?;
            }
            _ => return Err(error!(SyntaxError; "'=' expected")),
        }
        self.separator()
    }

    fn if_then(&mut self) -> Result<Flow> {
        let condition = self.expr()?.is_true();
        if !self.lex.next()?.is_word(Word::Then) {
            return Err(error!(SyntaxError; "THEN expected"));
        }
        while self.lex.next()? == Token::LineFeed {}
        self.lex.reset();
        let save = self.active;
        self.active = save && condition;
        let flow = self.statement();
        self.active = save;
        flow
    }

    fn label(&self, key: &str) -> Result<Address> {
        match self.labels.get(key) {
            Some(addr) => Ok(addr),
            None => Err(error!(UndefinedLabel; "GOTO/GOSUB to undefined label '{}'", key)),
        }
    }

    fn label_token(&mut self) -> Result<String> {
        match label_key(&self.lex.next()?)? {
            Some(key) => Ok(key),
            None => Err(error!(SyntaxError; "Label expected")),
        }
    }

    fn goto(&mut self, gosub: bool) -> Result<Flow> {
        let key = self.label_token()?;
        let addr = self.label(&key)?;
        if !self.active {
            return self.separator();
        }
        if gosub {
            self.gosub.push(Some(self.lex.pos()))?;
            trace!(label = %key, depth = self.gosub.len(), "gosub");
        } else {
            trace!(label = %key, "goto");
        }
        Ok(Flow::Jump(addr))
    }

    fn ret(&mut self) -> Result<Flow> {
        if !self.active {
            return self.separator();
        }
        match self.gosub.pop()? {
            Some(addr) => {
                trace!(depth = self.gosub.len(), "return");
                Ok(Flow::Jump(addr))
            }
            None => {
                trace!("return to host");
                Ok(Flow::Stop)
            }
        }
    }

    fn on(&mut self) -> Result<Flow> {
        let selector = self.expr()?.number();
        let gosub = match self.lex.next()? {
            Token::Word(Word::Goto) => false,
            Token::Word(Word::Gosub) => true,
            _ => return Err(error!(SyntaxError; "GOTO or GOSUB expected")),
        };
        let mut target = None;
        let mut index = 0;
        loop {
            let key = self.label_token()?;
            if self.active && index == selector {
                target = Some(self.label(&key)?);
            }
            index += 1;
            if self.lex.next()? != Token::Comma {
                self.lex.reset();
                break;
            }
        }
        match target {
            Some(addr) => {
                if gosub {
                    self.gosub.push(Some(self.lex.pos()))?;
                }
                trace!(selector, gosub, "on");
                Ok(Flow::Jump(addr))
            }
            None => self.separator(),
        }
    }

    /// Parse `ident = start TO stop [STEP step] DO`.
    fn for_header(&mut self) -> Result<(String, i32, i32, Option<i32>)> {
        let var = match self.lex.next()? {
            Token::Ident(name) => name,
            _ => return Err(error!(SyntaxError; "Identifier expected after FOR")),
        };
        if !self.lex.next()?.is_operator(Operator::Equal) {
            return Err(error!(SyntaxError; "'=' expected"));
        }
        let start = self.expr()?.number();
        if !self.lex.next()?.is_word(Word::To) {
            return Err(error!(SyntaxError; "TO expected"));
        }
        let stop = self.expr()?.number();
        let step = if self.lex.next()?.is_word(Word::Step) {
            Some(self.expr()?.number())
        } else {
            self.lex.reset();
            None
        };
        if !self.lex.next()?.is_word(Word::Do) {
            return Err(error!(SyntaxError; "DO expected"));
        }
        Ok((var, start, stop, step))
    }

    fn for_do(&mut self) -> Result<Flow> {
        self.for_stack.overflow_check()?;
        let header = self.lex.pos();
        let (var, start, _, _) = self.for_header()?;
        if self.lex.next()? != Token::LineFeed {
            return Err(error!(SyntaxError; "<LF> expected"));
        }
        if self.active {
            self.lex.reset();
            self.for_stack.push(header)?;
            self.vars.store(&var, Val::Number(start));
            return self.separator();
        }
        loop {
            let t = self.lex.next()?;
            match t {
                Token::Word(Word::Next) => break,
                Token::End => return Err(error!(SyntaxError; "NEXT expected")),
                Token::Number(_) | Token::LineFeed | Token::Colon => continue,
                Token::Ident(name) if is_label_name(&name) => {
                    let start = self.lex.mark();
                    if self.lex.next()? == Token::Colon {
                        continue;
                    }
                    self.lex.seek(start);
                }
                _ => self.lex.reset(),
            }
            self.statement()?;
        }
        self.separator()
    }

    fn next(&mut self) -> Result<Flow> {
        if !self.active {
            return self.separator();
        }
        let save = self.lex.pos();
        let header = *self.for_stack.last()?;
        self.lex.seek(header);
        let (var, start, stop, step) = self.for_header()?;
        let step = step.unwrap_or(if start < stop { 1 } else { -1 });
        let index = self.vars.fetch(&var).number();
        if index == stop {
            self.for_stack.pop()?;
            self.lex.seek(save);
            return self.separator();
        }
        self.vars.store(&var, Val::Number(index.wrapping_add(step)));
        trace!(var = %var, index, "next");
        Ok(Flow::Jump(self.lex.pos()))
    }

    fn expr(&mut self) -> Result<Val> {
        let mut val = self.and()?;
        while self.lex.next()?.is_operator(Operator::Or) {
            val = Val::Number(val.number() | self.and()?.number());
        }
        self.lex.reset();
        Ok(val)
    }

    fn and(&mut self) -> Result<Val> {
        let mut val = self.not()?;
        while self.lex.next()?.is_operator(Operator::And) {
            val = Val::Number(val.number() & self.not()?.number());
        }
        self.lex.reset();
        Ok(val)
    }

    fn not(&mut self) -> Result<Val> {
        if self.lex.next()?.is_operator(Operator::Not) {
            return Ok(Val::from(!self.comparison()?.is_true()));
        }
        self.lex.reset();
        self.comparison()
    }

    /// The left operand decides whether to compare as text or as numbers.
    fn comparison(&mut self) -> Result<Val> {
        let lhs = self.concat()?;
        let op = match self.lex.next()? {
            Token::Operator(op) if op.is_comparison() => op,
            _ => {
                self.lex.reset();
                return Ok(lhs);
            }
        };
        let rhs = self.concat()?;
        let ordering = match &lhs {
            Val::String(s) => s.as_str().cmp(rhs.into_string().as_str()),
            Val::Number(n) => n.cmp(&rhs.number()),
        };
        use std::cmp::Ordering::*;
        Ok(Val::from(match op {
            Operator::Equal => ordering == Equal,
            Operator::Less => ordering == Less,
            Operator::Greater => ordering == Greater,
            _ => ordering != Equal,
        }))
    }

    fn concat(&mut self) -> Result<Val> {
        let mut val = self.additive()?;
        while self.lex.next()?.is_operator(Operator::Concat) {
            let mut s = val.into_string();
            s.push_str(&self.additive()?.into_string());
            val = Val::String(s);
        }
        self.lex.reset();
        Ok(val)
    }

    fn additive(&mut self) -> Result<Val> {
        let mut val = self.multiplicative()?;
        loop {
            match self.lex.next()? {
                Token::Operator(Operator::Plus) => {
                    let rhs = self.multiplicative()?.number();
                    val = Val::Number(val.number().wrapping_add(rhs));
                }
                Token::Operator(Operator::Minus) => {
                    let rhs = self.multiplicative()?.number();
                    val = Val::Number(val.number().wrapping_sub(rhs));
                }
                _ => {
                    self.lex.reset();
                    return Ok(val);
                }
            }
        }
    }

    fn multiplicative(&mut self) -> Result<Val> {
        let mut val = self.unary()?;
        loop {
            let op = match self.lex.next()? {
                Token::Operator(op @ Operator::Multiply)
                | Token::Operator(op @ Operator::Divide)
                | Token::Operator(op @ Operator::Modulus) => op,
                _ => {
                    self.lex.reset();
                    return Ok(val);
                }
            };
            let lhs = val.number();
            let rhs = self.unary()?.number();
            if op != Operator::Multiply && rhs == 0 {
                return Err(error!(DivisionByZero; "Divide by zero"));
            }
            val = Val::Number(match op {
                Operator::Multiply => lhs.wrapping_mul(rhs),
                Operator::Divide => lhs.wrapping_div(rhs),
                _ => lhs.wrapping_rem(rhs),
            });
        }
    }

    fn unary(&mut self) -> Result<Val> {
        match self.lex.next()? {
            Token::Operator(Operator::Minus) => Ok(Val::Number(self.atom()?.number().wrapping_neg())),
            Token::Operator(Operator::Plus) => self.atom(),
            _ => {
                self.lex.reset();
                self.atom()
            }
        }
    }

    fn atom(&mut self) -> Result<Val> {
        match self.lex.next()? {
            Token::LParen => {
                let val = self.expr()?;
                if self.lex.next()? != Token::RParen {
                    return Err(error!(SyntaxError; "Missing ')'"));
                }
                Ok(val)
            }
            Token::Number(s) => Ok(Val::Number(parse_number(&s)?)),
            Token::String(s) => Ok(Val::String(s)),
            Token::Ident(name) => match self.lex.next()? {
                Token::LParen => self.call(&name),
                Token::LBracket => {
                    let name = self.index(&name)?;
                    self.read(&name)
                }
                _ => {
                    self.lex.reset();
                    self.read(&name)
                }
            },
            _ => Err(error!(SyntaxError; "Value expected")),
        }
    }

    /// Parse `expr]` and return the flat element name.
    fn index(&mut self, base: &str) -> Result<String> {
        let index = self.expr()?;
        if self.lex.next()? != Token::RBracket {
            return Err(error!(SyntaxError; "Missing ']'"));
        }
        Ok(element_name(base, &index))
    }

    fn read(&self, name: &str) -> Result<Val> {
        match self.vars.get(name) {
            Some(val) => Ok(val.clone()),
            None if self.active && self.config.is_strict() => {
                Err(error!(UndefinedVariable; "Read from undefined variable '{}'", name))
            }
            None => Ok(Val::default_for(name)),
        }
    }

    /// Parse the arguments after `name(` and call the function if active.
    fn call(&mut self, name: &str) -> Result<Val> {
        let mut vals = vec![];
        loop {
            if self.lex.next()? == Token::RParen {
                break;
            }
            self.lex.reset();
            if vals.len() >= self.config.param_count() {
                return Err(error!(IllegalFunctionCall; "Too many parameters to function {}", name));
            }
            vals.push(self.expr()?);
            match self.lex.next()? {
                Token::RParen => break,
                Token::Comma => {}
                _ => return Err(error!(SyntaxError; "Expected ')'")),
            }
        }
        let func = match self.functions.get(name) {
            Some(func) => func,
            None => return Err(error!(UndefinedFunction; "Call to undefined function {}()", name)),
        };
        if !self.active {
            return Ok(Val::default_for(name));
        }
        func(self, &Args::new(vals))
    }
}
