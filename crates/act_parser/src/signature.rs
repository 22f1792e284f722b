use act_types::{FunctionType, Parameter};

/// A recognized function signature head, before its body has been located.
#[derive(Debug, Clone)]
pub struct RawSignature {
    pub name: String,
    /// 1-based line number of the function name token.
    pub name_line: u32,
    pub is_static: bool,
    pub return_type: String,
    pub function_type: FunctionType,
    pub macro_type: Option<&'static str>,
    pub memory_class: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Byte offset in the file's content, just past the closing `)` of the
    /// parameter list — where the search for the body's `{` begins.
    pub params_end_offset: usize,
}

/// A line is a plausible declaration head if it contains `(` and does not
/// contain `;` before the first `(` (§4.1.3) — this is the cheap, per-line
/// filter that lets the parser skip statement lines without ever running a
/// pattern across the whole file.
pub fn looks_like_declaration_head(line: &str) -> bool {
    match line.find('(') {
        None => false,
        Some(paren_idx) => match line.find(';') {
            Some(semi_idx) => semi_idx >= paren_idx,
            None => true,
        },
    }
}
