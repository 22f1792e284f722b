//! Expands a [`FunctionDatabase`]'s call graph into a tree rooted at a start
//! function (§4.3).

use std::collections::HashSet;
use std::path::PathBuf;

use act_db::FunctionDatabase;
use act_types::{AnalysisResult, AnalysisStatistics, CallTreeNode, CircularDependency};
use chrono::Utc;

/// Depth-first call-tree expander. Borrows the database for the lifetime of
/// one `build` call; it never mutates it.
pub struct CallTreeBuilder<'a> {
    db: &'a FunctionDatabase,
}

impl<'a> CallTreeBuilder<'a> {
    pub fn new(db: &'a FunctionDatabase) -> Self {
        CallTreeBuilder { db }
    }

    /// §4.3.1's public contract: `build(start_name, max_depth, include_rte)`.
    pub fn build(&self, start_name: &str, max_depth: usize, include_rte: bool) -> AnalysisResult {
        let Some(root_record) = self.db.lookup(start_name, None) else {
            return AnalysisResult::not_found(start_name, max_depth);
        };

        let mut stats = AnalysisStatistics::default();
        let mut circular_dependencies = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut call_stack: Vec<String> = Vec::new();

        visited.insert(root_record.qualified_name.clone());
        accumulate_record_stats(&mut stats, &root_record);
        stats.unique_functions += 1;

        let mut root_node = CallTreeNode::root(root_record.clone());
        call_stack.push(root_record.qualified_name.clone());
        self.expand(
            &mut root_node,
            &mut call_stack,
            &mut visited,
            &mut stats,
            &mut circular_dependencies,
            max_depth,
            include_rte,
        );
        call_stack.pop();

        AnalysisResult {
            root_function: start_name.to_string(),
            call_tree: Some(root_node),
            statistics: stats,
            circular_dependencies,
            errors: Vec::new(),
            timestamp: Utc::now(),
            source_directory: self.db.source_root().map(PathBuf::from),
            max_depth_limit: max_depth,
        }
    }

    /// Processes every call site recorded on `node.function_info`, appending
    /// resolved children to `node.children` (§4.3.2, steps 1–4).
    fn expand(
        &self,
        node: &mut CallTreeNode,
        call_stack: &mut Vec<String>,
        visited: &mut HashSet<String>,
        stats: &mut AnalysisStatistics,
        cycles: &mut Vec<CircularDependency>,
        max_depth: usize,
        include_rte: bool,
    ) {
        let context_file = node.function_info.file_path.clone();
        let parent_depth = node.depth;
        let child_depth = parent_depth + 1;

        for call in node.function_info.calls.clone() {
            // Step 1: resolve via smart lookup, skipping unresolved callees
            // without raising an error (§7).
            let Some(callee) = self.db.lookup(&call.name, Some(&context_file)) else {
                log::debug!("unresolved callee '{}' from {}", call.name, context_file.display());
                continue;
            };
            let callee_qn = callee.qualified_name.clone();

            stats.total_function_calls += 1;
            accumulate_record_stats(stats, &callee);
            if visited.insert(callee_qn.clone()) {
                stats.unique_functions += 1;
            }

            let mut child = if let Some(cycle_start) = call_stack.iter().position(|qn| qn == &callee_qn) {
                // Step 2: cycle.
                let mut cycle: Vec<String> = call_stack[cycle_start..].to_vec();
                cycle.push(callee_qn.clone());
                cycles.push(CircularDependency {
                    cycle,
                    depth_detected: child_depth,
                });
                stats.circular_dependencies_found += 1;
                let mut leaf = CallTreeNode::leaf(callee.clone(), child_depth);
                leaf.is_recursive = true;
                leaf
            } else if parent_depth == max_depth {
                // Step 3: depth bound.
                let mut leaf = CallTreeNode::leaf(callee.clone(), child_depth);
                leaf.is_truncated = true;
                leaf
            } else if !include_rte && callee.is_rte() {
                // §4.3.1: RTE calls are created but not descended into when
                // `include_rte` is false.
                CallTreeNode::leaf(callee.clone(), child_depth)
            } else {
                // Step 4: descend.
                call_stack.push(callee_qn);
                let mut child_node = CallTreeNode::leaf(callee.clone(), child_depth);
                self.expand(&mut child_node, call_stack, visited, stats, cycles, max_depth, include_rte);
                call_stack.pop();
                child_node
            };

            child.is_optional = call.is_conditional;
            child.condition = call.condition.clone();
            child.is_loop = call.is_loop;
            child.loop_condition = call.loop_condition.clone();

            stats.max_depth_reached = stats.max_depth_reached.max(child.depth);
            node.children.push(child);
        }
    }
}

fn accumulate_record_stats(stats: &mut AnalysisStatistics, record: &act_types::FunctionInfo) {
    stats.total_functions += 1;
    if record.is_static {
        stats.static_functions += 1;
    }
    if record.is_rte() {
        stats.rte_functions += 1;
    }
    if record.function_type.is_autosar() {
        stats.autosar_functions += 1;
    }
}
