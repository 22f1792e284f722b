use std::path::Path;

/// External collaborator consulted at insertion time to assign a
/// `FunctionInfo`'s `sw_module` (§4.2.5, §6 "Consumed — Module mapping").
///
/// The YAML-backed rule set described in §6 (exact filename → glob pattern
/// → default, in that priority order) is a loader that lives outside this
/// workspace's scope (§1); this trait is the seam it would plug into.
pub trait ModuleMapper: Send + Sync {
    fn module_for(&self, file_path: &Path) -> Option<String>;
}

/// Default `ModuleMapper` that assigns no module to anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullModuleMapper;

impl ModuleMapper for NullModuleMapper {
    fn module_for(&self, _file_path: &Path) -> Option<String> {
        None
    }
}

/// Injectable sink for user-facing progress text (§6, §9 "the source uses a
/// module-level console which does not belong in the core").
///
/// Distinct from the `log` facade used elsewhere in this crate family for
/// developer-facing diagnostics: this is for the "Parsing file 41/612..."
/// style output a CLI adapter would render, not for debugging the core
/// itself.
pub trait ProgressSink: Send + Sync {
    fn message(&self, msg: &str);
}

/// Default no-op sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn message(&self, _msg: &str) {}
}
