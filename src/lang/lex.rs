use super::{token::*, Error};
use crate::error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Longest snippet of source reported with an error.
const MAX_ERROR_TEXT: usize = 79;

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Saved lexer position, used to come back after a nested run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pos: usize,
    last: Option<usize>,
    halted: bool,
}

/// ## Cursor tokenizer
///
/// Produces one token at a time from an immutable script. The position
/// before the most recent token is remembered so exactly one token can be
/// pushed back with `reset`. The cursor always rests between tokens.
#[derive(Debug, Clone)]
pub struct Lexer {
    src: Rc<str>,
    pos: usize,
    last: Option<usize>,
    halted: bool,
    max_token_len: usize,
}

impl Default for Lexer {
    fn default() -> Lexer {
        Lexer::new("", 80)
    }
}

impl Lexer {
    pub fn new<S: Into<Rc<str>>>(src: S, max_token_len: usize) -> Lexer {
        Lexer {
            src: src.into(),
            pos: 0,
            last: None,
            halted: false,
            max_token_len,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Position before the most recently scanned token.
    pub fn mark(&self) -> usize {
        self.last.unwrap_or(self.pos)
    }

    pub fn seek(&mut self, pos: usize) {
        debug_assert!(self.src.is_char_boundary(pos));
        self.pos = pos;
        self.last = None;
    }

    /// Push back the most recent token.
    pub fn reset(&mut self) {
        if let Some(last) = self.last {
            self.pos = last;
        }
    }

    /// Everything after a halt scans as end of input.
    pub fn halt(&mut self) {
        self.halted = true;
        self.last = None;
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            pos: self.pos,
            last: self.last,
            halted: self.halted,
        }
    }

    pub fn restore(&mut self, cursor: Cursor) {
        self.pos = cursor.pos;
        self.last = cursor.last;
        self.halted = cursor.halted;
    }

    /// 1-based line of the cursor.
    pub fn line_number(&self) -> usize {
        let end = self.pos.min(self.src.len());
        1 + self.src[..end].matches('\n').count()
    }

    /// Source from the cursor to the end of its line.
    pub fn snippet(&self) -> String {
        let start = self.pos.min(self.src.len());
        self.src[start..]
            .chars()
            .take_while(|&c| c != '\n')
            .take(MAX_ERROR_TEXT)
            .collect()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    pub fn next(&mut self) -> Result<Token> {
        if self.halted {
            return Ok(Token::End);
        }
        self.last = Some(self.pos);
        loop {
            while let Some(c) = self.peek() {
                if !c.is_ascii_whitespace() {
                    break;
                }
                self.bump(c);
                if c == '\n' {
                    return Ok(Token::LineFeed);
                }
            }
            match self.peek() {
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump(c);
                    }
                }
                Some('\\') => self.continuation()?,
                _ => break,
            }
        }
        self.last = Some(self.pos);
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::End),
        };
        if is_quote(c) {
            self.bump(c);
            return self.string(c, true);
        }
        if (c == 'r' || c == 'R') && self.peek2().map_or(false, is_quote) {
            self.bump(c);
            if let Some(q) = self.peek() {
                self.bump(q);
                return self.string(q, false);
            }
        }
        if is_ident_start(c) {
            return self.alphabetic();
        }
        if c.is_ascii_digit() {
            return self.number();
        }
        match Token::from_char(c) {
            Some(t) => {
                self.bump(c);
                Ok(t)
            }
            None => Err(error!(SyntaxError; "Unknown token '{}'", c)),
        }
    }

    fn continuation(&mut self) -> Result<()> {
        self.bump('\\');
        while let Some(c) = self.peek() {
            if c == '\n' || !c.is_ascii_whitespace() {
                break;
            }
            self.bump(c);
        }
        if self.peek() != Some('\n') {
            return Err(error!(SyntaxError; "Bad '\\' at end of line"));
        }
        self.bump('\n');
        Ok(())
    }

    fn too_long(&self, len: usize) -> Result<()> {
        if len >= self.max_token_len {
            Err(error!(SyntaxError; "Token too long"))
        } else {
            Ok(())
        }
    }

    fn string(&mut self, term: char, escapes: bool) -> Result<Token> {
        let mut s = String::new();
        let mut len = 0;
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(error!(SyntaxError; "Unterminated string")),
            };
            self.bump(c);
            if c == term {
                return Ok(Token::String(s));
            }
            len += 1;
            self.too_long(len)?;
            if escapes && c == '\\' {
                let e = match self.peek() {
                    Some(e) => e,
                    None => return Err(error!(SyntaxError; "Unterminated string")),
                };
                self.bump(e);
                s.push(match e {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    _ => e,
                });
            } else {
                s.push(c);
            }
        }
    }

    fn alphabetic(&mut self) -> Result<Token> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            self.too_long(s.len() + 1)?;
            self.bump(c);
            s.push(c.to_ascii_lowercase());
        }
        if self.peek() == Some('$') {
            self.bump('$');
            s.push('$');
            return Ok(Token::Ident(s));
        }
        Ok(Token::from_string(&s).unwrap_or(Token::Ident(s)))
    }

    fn number(&mut self) -> Result<Token> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.too_long(s.len() + 1)?;
            self.bump(c);
            s.push(c);
        }
        Ok(Token::Number(s))
    }
}
