use super::Address;
use crate::error;
use crate::lang::{Error, Lexer, Token};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// ## Label table
///
/// Jump targets for GOTO and GOSUB. Numeric labels are keyed by their
/// decimal value so `010` and `10` name the same line.

#[derive(Debug, Default)]
pub struct Labels {
    symbols: HashMap<String, Address>,
}

/// Value of a number token; literals past `i32` are an error.
pub fn parse_number(s: &str) -> Result<i32> {
    match s.parse::<i32>() {
        Ok(n) => Ok(n),
        Err(_) => Err(error!(Overflow; "Number {} is too large", s)),
    }
}

/// String variable names never name a label.
pub fn is_label_name(name: &str) -> bool {
    !name.ends_with('$')
}

/// Lookup key for a label token, or `None` if it cannot name a label.
pub fn label_key(token: &Token) -> Result<Option<String>> {
    match token {
        Token::Ident(s) if is_label_name(s) => Ok(Some(s.clone())),
        Token::Number(s) => Ok(Some(parse_number(s)?.to_string())),
        _ => Ok(None),
    }
}

impl Labels {
    pub fn new() -> Labels {
        Labels::default()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<Address> {
        self.symbols.get(label).copied()
    }

    fn insert(&mut self, label: String, addr: Address) -> Result<()> {
        if self.symbols.contains_key(&label) {
            return Err(error!(SyntaxError; "Duplicate label '{}'", label));
        }
        self.symbols.insert(label, addr);
        Ok(())
    }

    /// Record every label in the script. A label is a number, or an
    /// identifier followed by `:`, at the start of a line. Numeric labels
    /// must strictly increase. The lexer is returned to where it started
    /// unless an error stops the scan.
    pub fn scan(&mut self, lex: &mut Lexer) -> Result<()> {
        let start = lex.cursor();
        let mut previous: Option<i32> = None;
        let mut line_start = true;
        loop {
            if !line_start {
                match lex.next()? {
                    Token::End => break,
                    Token::LineFeed => {}
                    _ => continue,
                }
            }
            line_start = false;
            match lex.next()? {
                Token::Number(s) => {
                    let n = parse_number(&s)?;
                    if previous.map_or(false, |p| n <= p) {
                        lex.reset();
                        return Err(error!(SyntaxError; "Label {} out of sequence", n));
                    }
                    previous = Some(n);
                    self.insert(n.to_string(), lex.pos())?;
                }
                Token::Ident(s) if is_label_name(&s) => {
                    if lex.next()? == Token::Colon {
                        self.insert(s, lex.pos())?;
                    } else {
                        lex.reset();
                    }
                }
                _ => lex.reset(),
            }
        }
        lex.restore(start);
        Ok(())
    }
}
