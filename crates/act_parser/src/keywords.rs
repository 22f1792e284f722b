use once_cell::sync::Lazy;
use std::collections::HashSet;

/// The full C11 reserved keyword set (§4.1.2): tokens that must never be
/// accepted as a `return_type` or `name`.
pub static C_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
        "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
        "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch",
        "typedef", "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof",
        "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
        "_Thread_local",
    ]
    .into_iter()
    .collect()
});

/// AUTOSAR primitive/return types filtered out of call extraction (§4.1.6) —
/// `IDENT(` where `IDENT` is one of these is a cast or declaration, not a
/// call.
pub static AUTOSAR_PRIMITIVE_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "uint8", "uint16", "uint32", "uint64", "sint8", "sint16", "sint32", "sint64", "boolean",
        "Boolean", "float32", "float64", "Std_ReturnType", "StatusType",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `ident` is a literal-suffix macro like `INT32_C`,
/// `UINT32_C` (§4.1.6) — these appear as `IDENT(` in expressions but are
/// never function calls.
pub fn is_literal_suffix_macro(ident: &str) -> bool {
    let Some(prefix) = ident.strip_suffix("_C") else {
        return false;
    };
    !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Whether `ident` should never be treated as a called function name.
pub fn is_non_call_identifier(ident: &str) -> bool {
    C_KEYWORDS.contains(ident)
        || AUTOSAR_PRIMITIVE_TYPES.contains(ident)
        || is_literal_suffix_macro(ident)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_literal_suffix_macros() {
        assert!(is_literal_suffix_macro("INT32_C"));
        assert!(is_literal_suffix_macro("UINT32_C"));
        assert!(!is_literal_suffix_macro("Demo_Init"));
        assert!(!is_literal_suffix_macro("_C"));
    }

    #[test]
    fn keyword_set_rejects_reserved_names() {
        assert!(C_KEYWORDS.contains("for"));
        assert!(C_KEYWORDS.contains("_Atomic"));
        assert!(!C_KEYWORDS.contains("Demo_Init"));
    }
}
