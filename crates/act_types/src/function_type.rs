use serde::{Deserialize, Serialize};

/// Tag describing how a function's definition was recognized by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionType {
    /// `FUNC(T, MC) name(...)`.
    AutosarFunc,
    /// `FUNC_P2VAR(T, PC, MC) name(...)`.
    AutosarFuncP2Var,
    /// `FUNC_P2CONST(T, PC, MC) name(...)`.
    AutosarFuncP2Const,
    /// `[static] [inline] T name(...)`.
    TraditionalC,
    /// An AUTOSAR runtime-environment call, identified by the `Rte_` prefix.
    RteCall,
    /// Recognized as a function but its macro form could not be classified.
    Unknown,
}

impl FunctionType {
    /// Whether this function type denotes an AUTOSAR RTE entry point.
    pub fn is_rte(self) -> bool {
        matches!(self, FunctionType::RteCall)
    }

    /// Whether this function type was produced by one of the three AUTOSAR
    /// function macros (`FUNC`, `FUNC_P2VAR`, `FUNC_P2CONST`).
    pub fn is_autosar(self) -> bool {
        matches!(
            self,
            FunctionType::AutosarFunc | FunctionType::AutosarFuncP2Var | FunctionType::AutosarFuncP2Const
        )
    }
}
