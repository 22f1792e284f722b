use std::collections::HashSet;

use act_types::FunctionType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::balanced::{find_matching_paren, split_params_balanced};
use crate::keywords::C_KEYWORDS;
use crate::lines::LineIndex;
use crate::params::parse_parameter;
use crate::signature::{looks_like_declaration_head, RawSignature};

const MAX_CONTINUATION_LINES: usize = 10;

const TYPE_CLASS: &str = r"[A-Za-z_][A-Za-z0-9_ \t\*]{0,99}?";
const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_]{0,49}";

static TRAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s)\A[ \t]*(?:(?P<st>static)[ \t]+)?(?:(?:inline|__inline|__inline__)[ \t]+)?(?P<ty>{TYPE_CLASS})[ \t]+(?P<name>{IDENT})[ \t]*\("
    ))
    .unwrap()
});

// Used for §4.1.5's "return type on the line before the name" fallback.
static NAME_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\A[ \t]*(?P<name>{IDENT})[ \t]*\(")).unwrap());
static PURE_TYPE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\A[ \t]*(?:(?P<st>static)[ \t]+)?(?:(?:inline|__inline|__inline__)[ \t]+)?(?P<ty>[A-Za-z_][A-Za-z0-9_ \t\*]{0,99})[ \t]*\z")
        .unwrap()
});

fn is_rejected_token(token: &str) -> bool {
    C_KEYWORDS.contains(token)
}

/// Scans for `[static] [inline] return_type name(params) {` declarations
/// (§4.1.2), plus the AUTOSAR-specific "return type on the previous line"
/// variant (§4.1.5).
pub fn scan_traditional_signatures(content: &str, line_index: &LineIndex) -> Vec<RawSignature> {
    let mut results = Vec::new();
    let mut consumed_name_lines: HashSet<u32> = HashSet::new();
    let bytes = content.as_bytes();

    for line_idx in 0..line_index.line_count() {
        let (ls, le) = line_index.line_range(line_idx, content);
        let line = &content[ls..le];
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            continue;
        }
        if !looks_like_declaration_head(line) {
            continue;
        }

        let mut matched = None;
        for extra in 0..=MAX_CONTINUATION_LINES {
            if line_idx + extra >= line_index.line_count() {
                break;
            }
            let (win_start, win) = line_index.window(content, line_idx, extra);
            if let Some(caps) = TRAD_RE.captures(win) {
                matched = Some((win_start, caps));
                break;
            }
        }
        let Some((win_start, caps)) = matched else {
            continue;
        };

        let ty_raw = caps.name("ty").unwrap().as_str().trim();
        if ty_raw.starts_with('#') || is_rejected_token(ty_raw) {
            continue;
        }
        let name = caps.name("name").unwrap().as_str();
        if is_rejected_token(name) {
            continue;
        }

        let name_match = caps.name("name").unwrap();
        let name_offset = win_start + name_match.start();
        let name_line = line_index.line_of_offset(name_offset);

        let open_paren_idx = win_start + caps.get(0).unwrap().end() - 1;
        let Some(close_idx) = find_matching_paren(bytes, open_paren_idx) else {
            continue;
        };
        let params_text = &content[open_paren_idx + 1..close_idx - 1];
        let parameters = split_params_balanced(params_text)
            .iter()
            .map(|p| parse_parameter(p))
            .collect();

        consumed_name_lines.insert(name_line);
        results.push(RawSignature {
            name: name.to_string(),
            name_line,
            is_static: caps.name("st").is_some(),
            return_type: ty_raw.to_string(),
            function_type: FunctionType::TraditionalC,
            macro_type: None,
            memory_class: None,
            parameters,
            params_end_offset: close_idx,
        });
    }

    scan_return_type_on_previous_line(content, line_index, &mut consumed_name_lines, &mut results);
    results
}

/// §4.1.5: a line containing only `identifier(` whose immediately preceding
/// non-blank line is a pure type-token sequence.
fn scan_return_type_on_previous_line(
    content: &str,
    line_index: &LineIndex,
    consumed_name_lines: &mut HashSet<u32>,
    results: &mut Vec<RawSignature>,
) {
    let bytes = content.as_bytes();

    for line_idx in 1..line_index.line_count() {
        let (ls, le) = line_index.line_range(line_idx, content);
        let line = &content[ls..le];
        if !looks_like_declaration_head(line) {
            continue;
        }
        let Some(caps) = NAME_ONLY_RE.captures(line) else {
            continue;
        };
        let name_line = (line_idx + 1) as u32;
        if consumed_name_lines.contains(&name_line) {
            continue;
        }

        // Walk back over blank lines to find the type-only line.
        let mut prev_idx = line_idx;
        let mut prev_line = "";
        loop {
            if prev_idx == 0 {
                prev_line = "";
                break;
            }
            prev_idx -= 1;
            let (ps, pe) = line_index.line_range(prev_idx, content);
            let candidate = content[ps..pe].trim();
            if !candidate.is_empty() {
                prev_line = &content[ps..pe];
                break;
            }
        }
        let Some(ty_caps) = PURE_TYPE_LINE_RE.captures(prev_line) else {
            continue;
        };
        let ty_raw = ty_caps.name("ty").unwrap().as_str().trim();
        if ty_raw.is_empty() || ty_raw.starts_with('#') || is_rejected_token(ty_raw) {
            continue;
        }

        let name = caps.name("name").unwrap().as_str();
        if is_rejected_token(name) {
            continue;
        }

        let open_paren_idx = ls + caps.get(0).unwrap().end() - 1;
        let Some(close_idx) = find_matching_paren(bytes, open_paren_idx) else {
            continue;
        };

        // Guard against matching a plain call statement: a real definition
        // is followed by `{`, not `;`, once whitespace is skipped.
        let mut after = close_idx;
        while after < bytes.len() && (bytes[after] as char).is_whitespace() {
            after += 1;
        }
        if after >= bytes.len() || bytes[after] != b'{' {
            continue;
        }

        let params_text = &content[open_paren_idx + 1..close_idx - 1];
        let parameters = split_params_balanced(params_text)
            .iter()
            .map(|p| parse_parameter(p))
            .collect();

        consumed_name_lines.insert(name_line);
        results.push(RawSignature {
            name: name.to_string(),
            name_line,
            is_static: ty_caps.name("st").is_some(),
            return_type: ty_raw.to_string(),
            function_type: FunctionType::TraditionalC,
            macro_type: None,
            memory_class: None,
            parameters,
            params_end_offset: close_idx,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_plain_function() {
        let content = "void Hw_InitHardware(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_traditional_signatures(content, &idx);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].name, "Hw_InitHardware");
        assert_eq!(sigs[0].return_type, "void");
        assert!(!sigs[0].is_static);
    }

    #[test]
    fn recognizes_static_inline() {
        let content = "static inline int add(int a, int b)\n{\n  return a + b;\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_traditional_signatures(content, &idx);
        assert_eq!(sigs.len(), 1);
        assert!(sigs[0].is_static);
        assert_eq!(sigs[0].name, "add");
        assert_eq!(sigs[0].parameters.len(), 2);
    }

    #[test]
    fn rejects_keyword_as_name_or_type() {
        let content = "if (x) { foo(); }\nfor (i = 0; i < 1; i++) { bar(); }\n";
        let idx = LineIndex::new(content);
        let sigs = scan_traditional_signatures(content, &idx);
        assert!(sigs.is_empty());
    }

    #[test]
    fn skips_preprocessor_lines() {
        let content = "#define FOO(x) (x)\n";
        let idx = LineIndex::new(content);
        let sigs = scan_traditional_signatures(content, &idx);
        assert!(sigs.is_empty());
    }

    #[test]
    fn return_type_on_previous_line_is_recognized() {
        let content = "uint8\nDemo_Compute(uint8 x)\n{\n  return x;\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_traditional_signatures(content, &idx);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].name, "Demo_Compute");
        assert_eq!(sigs[0].return_type, "uint8");
        assert_eq!(sigs[0].name_line, 2);
    }

    #[test]
    fn plain_call_statement_is_not_mistaken_for_previous_line_declaration() {
        let content = "uint8\nDemo_Call(x);\n";
        let idx = LineIndex::new(content);
        let sigs = scan_traditional_signatures(content, &idx);
        assert!(sigs.is_empty());
    }
}
