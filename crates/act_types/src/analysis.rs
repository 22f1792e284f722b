use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tree::CallTreeNode;

/// A detected call cycle: an ordered list of qualified names forming the
/// cycle (beginning and ending with the same name, per invariant B1), and
/// the depth at which the repeated name was encountered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularDependency {
    pub cycle: Vec<String>,
    pub depth_detected: usize,
}

/// Counters accumulated during a single `CallTreeBuilder::build` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total_functions: usize,
    pub unique_functions: usize,
    pub max_depth_reached: usize,
    pub total_function_calls: usize,
    pub static_functions: usize,
    pub rte_functions: usize,
    pub autosar_functions: usize,
    pub circular_dependencies_found: usize,
}

/// The full result of one `CallTreeBuilder::build` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub root_function: String,
    pub call_tree: Option<CallTreeNode>,
    pub statistics: AnalysisStatistics,
    pub circular_dependencies: Vec<CircularDependency>,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub source_directory: Option<PathBuf>,
    pub max_depth_limit: usize,
}

impl AnalysisResult {
    /// Build the "start function not found" failure result described in
    /// §4.3.1.
    pub fn not_found(root_function: impl Into<String>, max_depth_limit: usize) -> Self {
        AnalysisResult {
            root_function: root_function.into(),
            call_tree: None,
            statistics: AnalysisStatistics::default(),
            circular_dependencies: Vec::new(),
            errors: vec!["start function not found".to_string()],
            timestamp: Utc::now(),
            source_directory: None,
            max_depth_limit,
        }
    }
}
