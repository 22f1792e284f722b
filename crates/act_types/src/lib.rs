//! Shared data model for the AUTOSAR/C call-tree analysis core.
//!
//! This crate owns the types that flow between the parser, the function
//! database, and the call-tree builder, plus the two collaborator traits
//! (`ModuleMapper`, `ProgressSink`) those crates consume without owning an
//! implementation of.

mod analysis;
mod call;
mod collaborators;
mod error;
mod function_info;
mod function_type;
mod parameter;
mod tree;

pub use analysis::{AnalysisResult, AnalysisStatistics, CircularDependency};
pub use call::FunctionCall;
pub use collaborators::{ModuleMapper, NullModuleMapper, NullSink, ProgressSink};
pub use error::CoreError;
pub use function_info::{qualified_name, FunctionInfo};
pub use function_type::FunctionType;
pub use parameter::Parameter;
pub use tree::CallTreeNode;
