use std::fmt;

use serde::{Deserialize, Serialize};

/// A single formal parameter of a parsed function.
///
/// `name` may be empty for type-only declarations (e.g. a prototype that
/// only names the type, `void foo(int)`); `memory_class` is populated only
/// for parameters that came from an AUTOSAR parameter macro (`VAR`, `P2VAR`,
/// `P2CONST`, `CONST`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: String,
    pub is_pointer: bool,
    pub is_const: bool,
    pub memory_class: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            param_type: param_type.into(),
            is_pointer: false,
            is_const: false,
            memory_class: None,
        }
    }

    pub fn with_pointer(mut self, is_pointer: bool) -> Self {
        self.is_pointer = is_pointer;
        self
    }

    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    pub fn with_memory_class(mut self, memory_class: Option<String>) -> Self {
        self.memory_class = memory_class;
        self
    }
}

impl fmt::Display for Parameter {
    /// `[const ]<type>[*] <name>[ [<memclass>]]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.param_type)?;
        if self.is_pointer {
            write!(f, "*")?;
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        if let Some(mc) = &self.memory_class {
            write!(f, " [{}]", mc)?;
        }
        Ok(())
    }
}
