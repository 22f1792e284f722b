use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::function_info::FunctionInfo;

/// One node of a call tree produced by the builder.
///
/// Ownership flows parent-to-child only (`children` owns its entries); per
/// the design notes, the `parent` back-reference named in §3 is omitted —
/// tree consumers walk top-down, and a non-owning back-pointer would cost
/// either `Weak<RefCell<_>>` plumbing throughout this otherwise plain-data
/// type or an arena indirection, for no consumer that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub function_info: Arc<FunctionInfo>,
    pub depth: usize,
    pub children: Vec<CallTreeNode>,

    pub is_recursive: bool,
    pub is_truncated: bool,
    pub is_optional: bool,
    pub is_loop: bool,
    pub condition: Option<String>,
    pub loop_condition: Option<String>,
    pub call_count: usize,
}

impl CallTreeNode {
    pub fn root(function_info: Arc<FunctionInfo>) -> Self {
        CallTreeNode {
            function_info,
            depth: 0,
            children: Vec::new(),
            is_recursive: false,
            is_truncated: false,
            is_optional: false,
            is_loop: false,
            condition: None,
            loop_condition: None,
            call_count: 1,
        }
    }

    /// A leaf node that terminates expansion without error (cycle or depth
    /// truncation). Per invariant I4 this must never receive children.
    pub fn leaf(function_info: Arc<FunctionInfo>, depth: usize) -> Self {
        CallTreeNode {
            function_info,
            depth,
            children: Vec::new(),
            is_recursive: false,
            is_truncated: false,
            is_optional: false,
            is_loop: false,
            condition: None,
            loop_condition: None,
            call_count: 1,
        }
    }

    /// Count of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(CallTreeNode::subtree_size).sum::<usize>()
    }
}
