/// ## Runtime values
///
/// Every value is a number or a string. Operators coerce on demand:
/// strings become numbers the way C's `atoi` reads them, numbers become
/// their decimal text.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Val {
    Number(i32),
    String(String),
}

impl Default for Val {
    fn default() -> Val {
        Val::Number(0)
    }
}

impl Val {
    /// Leading integer of `s`; empty or non-numeric text is 0.
    pub fn parse_int(s: &str) -> i32 {
        let s = s.trim_start();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let mut n: i32 = 0;
        for d in digits.bytes().take_while(u8::is_ascii_digit) {
            n = n.wrapping_mul(10).wrapping_add((d - b'0') as i32);
        }
        if negative {
            n.wrapping_neg()
        } else {
            n
        }
    }

    pub fn number(&self) -> i32 {
        match self {
            Val::Number(n) => *n,
            Val::String(s) => Val::parse_int(s),
        }
    }

    pub fn is_true(&self) -> bool {
        self.number() != 0
    }

    pub fn into_string(self) -> String {
        match self {
            Val::String(s) => s,
            Val::Number(n) => n.to_string(),
        }
    }

    /// Uninitialized value for a variable name.
    pub fn default_for(name: &str) -> Val {
        let base = name.split('[').next().unwrap_or(name);
        if base.ends_with('$') {
            Val::String(String::new())
        } else {
            Val::Number(0)
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Number(n) => write!(f, "{}", n),
            Val::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Val {
        Val::Number(n)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Val {
        Val::Number(b as i32)
    }
}

impl From<String> for Val {
    fn from(s: String) -> Val {
        Val::String(s)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::String(s.to_string())
    }
}
