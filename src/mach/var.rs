use super::Val;
use std::collections::HashMap;

/// ## Variable memory
///
/// One namespace for every variable. Array elements are ordinary entries
/// whose key is the synthetic flat name `base[index]`.

#[derive(Debug, Default)]
pub struct Var {
    vars: HashMap<String, Val>,
}

/// Normalize a variable name: the base is case-insensitive, the
/// `[index]` part is kept exactly as written.
pub fn flat_name(name: &str) -> String {
    match name.find('[') {
        Some(i) => {
            let mut s = name[..i].to_ascii_lowercase();
            s.push_str(&name[i..]);
            s
        }
        None => name.to_ascii_lowercase(),
    }
}

/// Key for the element `index` of array `base`.
pub fn element_name(base: &str, index: &Val) -> String {
    format!("{}[{}]", base, index)
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, var_name: &str) -> Option<&Val> {
        self.vars.get(var_name)
    }

    /// Value of `var_name`, or the uninitialized value for its name.
    pub fn fetch(&self, var_name: &str) -> Val {
        match self.vars.get(var_name) {
            Some(val) => val.clone(),
            None => Val::default_for(var_name),
        }
    }

    /// Store replaces both the value and its type.
    pub fn store(&mut self, var_name: &str, value: Val) {
        match self.vars.get_mut(var_name) {
            Some(var) => *var = value,
            None => {
                self.vars.insert(var_name.to_string(), value);
            }
        }
    }
}
