/// ## Script errors
///
/// An `Error` is created where the problem is detected, usually with the
/// `error!` macro, and travels back up the parser as an ordinary `Result`.
/// The run that owns the error attaches the line number and the source
/// text at the failure point before handing it to the embedder.

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line: Option<usize>,
    message: String,
    text: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident; $($arg:tt)+) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message(format!($($arg)+))
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line: None,
            message: String::new(),
            text: String::new(),
        }
    }

    /// The error a host function raises to abort the running script.
    pub fn thrown<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorCode::Thrown).message(message)
    }

    pub fn message<S: Into<String>>(self, message: S) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.into(),
            ..self
        }
    }

    pub fn in_line(self, line: usize, text: &str) -> Error {
        Error {
            line: Some(line),
            text: text.to_string(),
            ..self
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Short human readable description.
    pub fn msg(&self) -> &str {
        if self.message.is_empty() {
            self.code.as_str()
        } else {
            &self.message
        }
    }

    /// Source text from the failing token to the end of its line.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SyntaxError = 2,
    StackUnderflow = 3,
    IllegalFunctionCall = 5,
    Overflow = 6,
    UndefinedLabel = 8,
    StackOverflow = 10,
    DivisionByZero = 11,
    UndefinedFunction = 18,
    UndefinedVariable = 19,
    Interrupted = 20,
    Thrown = 21,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            SyntaxError => "SYNTAX ERROR",
            StackUnderflow => "STACK UNDERFLOW",
            IllegalFunctionCall => "ILLEGAL FUNCTION CALL",
            Overflow => "OVERFLOW",
            UndefinedLabel => "UNDEFINED LABEL",
            StackOverflow => "STACK OVERFLOW",
            DivisionByZero => "DIVISION BY ZERO",
            UndefinedFunction => "UNDEFINED FUNCTION",
            UndefinedVariable => "UNDEFINED VARIABLE",
            Interrupted => "BREAK",
            Thrown => "ERROR",
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut suffix = String::new();
        if let Some(line) = self.line {
            suffix.push_str(&format!(" IN {}", line));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        write!(f, "{}{}", self.code.as_str(), suffix)
    }
}

impl std::error::Error for Error {}
