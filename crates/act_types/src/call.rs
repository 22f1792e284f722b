use serde::{Deserialize, Serialize};

/// A single call-site reference found inside a function body, enriched with
/// the innermost conditional/loop context it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub is_conditional: bool,
    pub condition: Option<String>,
    pub is_loop: bool,
    pub loop_condition: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionCall {
            name: name.into(),
            is_conditional: false,
            condition: None,
            is_loop: false,
            loop_condition: None,
        }
    }

    /// Merge another observation of the same call site into this one: flags
    /// are OR'd, and the most recently observed condition/loop_condition
    /// wins (per §4.1.6).
    pub fn merge(&mut self, other: &FunctionCall) {
        if other.is_conditional {
            self.is_conditional = true;
            self.condition = other.condition.clone();
        }
        if other.is_loop {
            self.is_loop = true;
            self.loop_condition = other.loop_condition.clone();
        }
    }
}
