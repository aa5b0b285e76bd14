use std::collections::HashMap;

thread_local!(
    static STRING_TO_TOKEN: HashMap<String, Token> = Word::ALL
        .iter()
        .map(|w| Token::Word(*w))
        .chain(Operator::WORDS.iter().map(|o| Token::Operator(*o)))
        .map(|t| (t.to_string().to_ascii_lowercase(), t))
        .collect();
);

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    End,
    LineFeed,
    Ident(String),
    Number(String),
    String(String),
    Word(Word),
    Operator(Operator),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
}

impl Token {
    /// Keyword lookup for an already lowercased identifier.
    pub fn from_string(s: &str) -> Option<Token> {
        STRING_TO_TOKEN.with(|stt| stt.get(s).cloned())
    }

    pub fn from_char(ch: char) -> Option<Token> {
        use Operator::*;
        Some(match ch {
            '=' => Token::Operator(Equal),
            '<' => Token::Operator(Less),
            '>' => Token::Operator(Greater),
            '~' => Token::Operator(NotEqual),
            '+' => Token::Operator(Plus),
            '-' => Token::Operator(Minus),
            '*' => Token::Operator(Multiply),
            '/' => Token::Operator(Divide),
            '%' => Token::Operator(Modulus),
            '&' => Token::Operator(Concat),
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ':' => Token::Colon,
            _ => return None,
        })
    }

    pub fn is_word(&self, word: Word) -> bool {
        matches!(self, Token::Word(w) if *w == word)
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        matches!(self, Token::Operator(o) if *o == op)
    }

    /// Tokens that may end a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Token::End | Token::LineFeed | Token::Word(Word::End))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            End => write!(f, "<END>"),
            LineFeed => write!(f, "<LF>"),
            Ident(s) => write!(f, "{}", s),
            Number(s) => write!(f, "{}", s),
            String(s) => write!(f, "\"{}\"", s),
            Word(s) => write!(f, "{}", s),
            Operator(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            LBracket => write!(f, "["),
            RBracket => write!(f, "]"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Word {
    Do,
    End,
    For,
    Gosub,
    Goto,
    If,
    Let,
    Next,
    On,
    Return,
    Step,
    Then,
    To,
}

impl Word {
    const ALL: [Word; 13] = [
        Word::Do,
        Word::End,
        Word::For,
        Word::Gosub,
        Word::Goto,
        Word::If,
        Word::Let,
        Word::Next,
        Word::On,
        Word::Return,
        Word::Step,
        Word::Then,
        Word::To,
    ];
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Do => write!(f, "DO"),
            End => write!(f, "END"),
            For => write!(f, "FOR"),
            Gosub => write!(f, "GOSUB"),
            Goto => write!(f, "GOTO"),
            If => write!(f, "IF"),
            Let => write!(f, "LET"),
            Next => write!(f, "NEXT"),
            On => write!(f, "ON"),
            Return => write!(f, "RETURN"),
            Step => write!(f, "STEP"),
            Then => write!(f, "THEN"),
            To => write!(f, "TO"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Equal,
    Less,
    Greater,
    NotEqual,
    Concat,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    Not,
    And,
    Or,
}

impl Operator {
    const WORDS: [Operator; 3] = [Operator::Not, Operator::And, Operator::Or];

    pub fn is_reserved_word(&self) -> bool {
        use Operator::*;
        match self {
            Equal | Less | Greater | NotEqual | Concat | Plus | Minus | Multiply | Divide
            | Modulus => false,
            Not | And | Or => true,
        }
    }

    pub fn is_comparison(&self) -> bool {
        use Operator::*;
        matches!(self, Equal | Less | Greater | NotEqual)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Equal => write!(f, "="),
            Less => write!(f, "<"),
            Greater => write!(f, ">"),
            NotEqual => write!(f, "~"),
            Concat => write!(f, "&"),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Modulus => write!(f, "%"),
            Not => write!(f, "NOT"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
        }
    }
}
