//! Hybrid C/AUTOSAR source parser.
//!
//! Scans a single `.c` file for function definitions — both the AUTOSAR
//! `FUNC`/`FUNC_P2VAR`/`FUNC_P2CONST` macro forms and traditional C
//! declarations — and extracts each function's parameters and call sites,
//! enriched with conditional/loop context. The parser never raises on a
//! malformed construct; it records what it can and moves on (§4.1, §7).

mod balanced;
mod calls;
mod comments;
mod keywords;
mod lines;
mod macro_autosar;
mod params;
mod signature;
mod traditional;

use std::collections::HashSet;
use std::path::Path;

use act_types::FunctionInfo;

use crate::balanced::find_body_range;
use crate::lines::LineIndex;
use crate::macro_autosar::scan_autosar_signatures;
use crate::signature::RawSignature;
use crate::traditional::scan_traditional_signatures;

/// Parses one `.c` file into its function records, in source-line order
/// (§5: "within a tree, children preserve the call-site order recorded by
/// the parser" — and more generally, the parser's own output is always
/// emitted in the order functions appear in the file).
///
/// Reads are lossy-UTF-8 (§7: malformed encoding never aborts a run). If the
/// file cannot be read at all, an empty list is returned and the caller is
/// expected to record the I/O failure itself.
pub fn parse_file(path: &Path) -> Vec<FunctionInfo> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(_) => return Vec::new(),
    };
    let content = String::from_utf8_lossy(&bytes).into_owned();
    parse_source(&content, path)
}

/// Parses already-loaded source text, as if it came from `file_path`. Split
/// out from [`parse_file`] so callers that already hold file contents (and
/// tests) don't need to round-trip through the filesystem.
pub fn parse_source(content: &str, file_path: &Path) -> Vec<FunctionInfo> {
    let stripped = comments::strip_comments(content);
    let line_index = LineIndex::new(&stripped);

    let autosar_sigs = scan_autosar_signatures(&stripped, &line_index);
    let traditional_sigs = scan_traditional_signatures(&stripped, &line_index);

    // §4.1.8: when a traditional-C match and an AUTOSAR macro match land on
    // the same (name, line), the AUTOSAR record wins and the traditional
    // one is discarded.
    let autosar_keys: HashSet<(String, u32)> = autosar_sigs
        .iter()
        .map(|s| (s.name.clone(), s.name_line))
        .collect();

    let mut signatures: Vec<RawSignature> = autosar_sigs;
    signatures.extend(
        traditional_sigs
            .into_iter()
            .filter(|s| !autosar_keys.contains(&(s.name.clone(), s.name_line))),
    );

    let bytes = stripped.as_bytes();
    let mut functions: Vec<FunctionInfo> = signatures
        .into_iter()
        .map(|sig| build_function_info(sig, bytes, &stripped, file_path))
        .collect();

    functions.sort_by_key(|f| f.line_number);
    functions
}

fn build_function_info(sig: RawSignature, bytes: &[u8], content: &str, file_path: &Path) -> FunctionInfo {
    let mut info = FunctionInfo::new(
        sig.name,
        file_path.to_path_buf(),
        sig.name_line,
        sig.function_type,
        sig.return_type,
    );
    info.is_static = sig.is_static;
    info.memory_class = sig.memory_class;
    info.macro_type = sig.macro_type.map(|s| s.to_string());
    info.parameters = sig.parameters;

    // §4.1.4: a missing closing brace yields an empty body, not a dropped
    // record.
    match find_body_range(bytes, sig.params_end_offset) {
        Some((body_start, body_end)) => {
            let body = &content[body_start..body_end];
            info.calls = calls::extract_calls(body);
        }
        None => {
            log::debug!("no closing brace found for {}, recording an empty body", info.name);
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("demo.c")
    }

    #[test]
    fn parses_autosar_function_with_calls() {
        let content = r#"
FUNC(void, RTE_CODE) Demo_Main(void)
{
  HW_InitHardware();
  if (x > 0) {
    Demo_Update(x);
  }
}
"#;
        let funcs = parse_source(content, &path());
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name, "Demo_Main");
        assert_eq!(funcs[0].qualified_name, "demo::Demo_Main");
        assert_eq!(funcs[0].calls.len(), 2);
        let update = funcs[0].calls.iter().find(|c| c.name == "Demo_Update").unwrap();
        assert!(update.is_conditional);
    }

    #[test]
    fn parses_traditional_function_and_preserves_order() {
        let content = r#"
void First(void)
{
  Second();
}

void Second(void)
{
}
"#;
        let funcs = parse_source(content, &path());
        assert_eq!(funcs.len(), 2);
        assert_eq!(funcs[0].name, "First");
        assert_eq!(funcs[1].name, "Second");
    }

    #[test]
    fn autosar_macro_wins_collision_with_traditional_scan() {
        // A line recognized by both scanners at the same name/line should
        // only produce one record, carrying the AUTOSAR classification.
        let content = "FUNC(void, RTE_CODE) Demo_Init(void)\n{\n}\n";
        let funcs = parse_source(content, &path());
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].function_type, act_types::FunctionType::AutosarFunc);
    }

    #[test]
    fn comments_do_not_confuse_signature_or_call_scanning() {
        let content = r#"
// Demo_Ignored(void) { not a real function }
void Demo_Real(void)
{
  /* block comment
     spanning lines */
  Demo_Call(); // trailing comment
}
"#;
        let funcs = parse_source(content, &path());
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].name, "Demo_Real");
        assert_eq!(funcs[0].calls.len(), 1);
        assert_eq!(funcs[0].calls[0].name, "Demo_Call");
    }

    #[test]
    fn missing_closing_brace_yields_empty_body_not_dropped_record() {
        let content = "void Demo_Broken(void)\n{\n  Demo_Call();\n";
        let funcs = parse_source(content, &path());
        assert_eq!(funcs.len(), 1);
        assert!(funcs[0].calls.is_empty());
    }

    #[test]
    fn nonexistent_file_returns_empty_list() {
        let funcs = parse_file(Path::new("/nonexistent/path/does_not_exist.c"));
        assert!(funcs.is_empty());
    }
}
