use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::call::FunctionCall;
use crate::function_type::FunctionType;
use crate::parameter::Parameter;

/// `<file-stem>::<name>`, per invariant I1. Falls back to the file's full
/// name (or an empty stem) when `file_path` has no conventional `.c` stem —
/// this only happens for malformed inputs and should not occur in practice.
pub fn qualified_name(file_path: &Path, name: &str) -> String {
    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    format!("{}::{}", stem, name)
}

/// The central record produced by the parser and indexed by the database.
///
/// Two `FunctionInfo`s are equal, and hash identically, iff their
/// `(name, file_path, line_number)` triples match — this mirrors the
/// teacher's `ItemLoc<N>` (`ra_hir::ids`), which hand-rolls `PartialEq`/`Eq`/
/// `Hash` over `(module, raw)` rather than deriving over every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub file_path: PathBuf,
    pub line_number: u32,
    pub is_static: bool,
    pub qualified_name: String,

    pub function_type: FunctionType,
    pub return_type: String,
    pub memory_class: Option<String>,
    pub macro_type: Option<String>,

    pub parameters: Vec<Parameter>,
    pub calls: Vec<FunctionCall>,
    pub sw_module: Option<String>,
}

impl FunctionInfo {
    pub fn new(
        name: impl Into<String>,
        file_path: PathBuf,
        line_number: u32,
        function_type: FunctionType,
        return_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let qualified = qualified_name(&file_path, &name);
        FunctionInfo {
            name,
            file_path,
            line_number,
            is_static: false,
            qualified_name: qualified,
            function_type,
            return_type: return_type.into(),
            memory_class: None,
            macro_type: None,
            parameters: Vec::new(),
            calls: Vec::new(),
            sw_module: None,
        }
    }

    /// Whether this function is an AUTOSAR RTE call, either because the
    /// parser classified it as such or because its name carries the `Rte_`
    /// prefix (per the glossary's "RTE call" definition).
    pub fn is_rte(&self) -> bool {
        self.function_type.is_rte() || self.name.starts_with("Rte_")
    }

    /// Whether this record has a real body (i.e. is more than a forward
    /// declaration) — used by smart-selection Level 1.
    pub fn has_body(&self) -> bool {
        !self.calls.is_empty()
    }
}

impl PartialEq for FunctionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.file_path == other.file_path
            && self.line_number == other.line_number
    }
}

impl Eq for FunctionInfo {}

impl Hash for FunctionInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.file_path.hash(state);
        self.line_number.hash(state);
    }
}
