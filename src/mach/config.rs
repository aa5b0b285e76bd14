/// ## Interpreter limits and switches
///
/// ```
/// use musl::mach::Config;
///
/// let config = Config::default().max_gosub(50).strict_variables(true);
/// assert_eq!(config.gosub_depth(), 50);
/// ```

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    max_gosub: usize,
    max_for: usize,
    max_params: usize,
    max_token_len: usize,
    strict_variables: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_gosub: 20,
            max_for: 5,
            max_params: 20,
            max_token_len: 80,
            strict_variables: false,
        }
    }
}

impl Config {
    pub fn max_gosub(self, max_gosub: usize) -> Config {
        Config { max_gosub, ..self }
    }

    pub fn max_for(self, max_for: usize) -> Config {
        Config { max_for, ..self }
    }

    pub fn max_params(self, max_params: usize) -> Config {
        Config { max_params, ..self }
    }

    pub fn max_token_len(self, max_token_len: usize) -> Config {
        Config {
            max_token_len: max_token_len.max(2),
            ..self
        }
    }

    /// Reading an undefined variable becomes an error.
    pub fn strict_variables(self, strict_variables: bool) -> Config {
        Config {
            strict_variables,
            ..self
        }
    }

    pub fn gosub_depth(&self) -> usize {
        self.max_gosub
    }

    pub fn for_depth(&self) -> usize {
        self.max_for
    }

    pub fn param_count(&self) -> usize {
        self.max_params
    }

    pub fn token_len(&self) -> usize {
        self.max_token_len
    }

    pub fn is_strict(&self) -> bool {
        self.strict_variables
    }
}
