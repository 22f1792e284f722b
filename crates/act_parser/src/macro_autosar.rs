use act_types::FunctionType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::balanced::{find_matching_paren, split_params_balanced};
use crate::lines::LineIndex;
use crate::params::parse_parameter;
use crate::signature::{looks_like_declaration_head, RawSignature};

/// How many continuation lines a multi-line macro invocation may span
/// before the parser gives up (§4.1.5: "collects continuation lines until
/// parentheses balance or a hard limit (~10 lines) is reached").
const MAX_CONTINUATION_LINES: usize = 10;

// Bounded per §4.1.3: return type 1-100 chars, identifiers 1-50 chars.
const TYPE_CLASS: &str = r"[A-Za-z_][A-Za-z0-9_ \t\*]{0,99}?";
const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_]{0,49}";

static FUNC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s)\A[ \t]*(?:(?P<st>STATIC)[ \t]+)?FUNC[ \t]*\([ \t]*(?P<ty>{TYPE_CLASS})[ \t]*,[ \t]*(?P<mc>{IDENT})[ \t]*\)[ \t]*(?P<name>{IDENT})[ \t]*\("
    ))
    .unwrap()
});
static FUNC_P2VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s)\A[ \t]*(?:(?P<st>STATIC)[ \t]+)?FUNC_P2VAR[ \t]*\([ \t]*(?P<ty>{TYPE_CLASS})[ \t]*,[ \t]*(?P<pc>{IDENT})[ \t]*,[ \t]*(?P<mc>{IDENT})[ \t]*\)[ \t]*(?P<name>{IDENT})[ \t]*\("
    ))
    .unwrap()
});
static FUNC_P2CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s)\A[ \t]*(?:(?P<st>STATIC)[ \t]+)?FUNC_P2CONST[ \t]*\([ \t]*(?P<ty>{TYPE_CLASS})[ \t]*,[ \t]*(?P<pc>{IDENT})[ \t]*,[ \t]*(?P<mc>{IDENT})[ \t]*\)[ \t]*(?P<name>{IDENT})[ \t]*\("
    ))
    .unwrap()
});

struct MacroRule {
    regex: &'static Lazy<Regex>,
    function_type: FunctionType,
    macro_type: &'static str,
    return_suffix: &'static str, // appended/wrapped per the return-type table in §4.1.1
}

fn rules() -> [MacroRule; 3] {
    [
        MacroRule {
            regex: &FUNC_RE,
            function_type: FunctionType::AutosarFunc,
            macro_type: "FUNC",
            return_suffix: "",
        },
        MacroRule {
            regex: &FUNC_P2VAR_RE,
            function_type: FunctionType::AutosarFuncP2Var,
            macro_type: "FUNC_P2VAR",
            return_suffix: "*",
        },
        MacroRule {
            regex: &FUNC_P2CONST_RE,
            function_type: FunctionType::AutosarFuncP2Const,
            macro_type: "FUNC_P2CONST",
            return_suffix: "const*",
        },
    ]
}

fn format_return_type(base: &str, suffix: &str) -> String {
    let base = base.trim();
    match suffix {
        "*" => format!("{base}*"),
        "const*" => format!("const {base}*"),
        _ => base.to_string(),
    }
}

/// Scans the whole file for AUTOSAR `FUNC`/`FUNC_P2VAR`/`FUNC_P2CONST`
/// declarations, line by line (§4.1.3).
pub fn scan_autosar_signatures(content: &str, line_index: &LineIndex) -> Vec<RawSignature> {
    let mut results = Vec::new();
    let bytes = content.as_bytes();

    for line_idx in 0..line_index.line_count() {
        let (ls, le) = line_index.line_range(line_idx, content);
        let line = &content[ls..le];
        if !looks_like_declaration_head(line) {
            continue;
        }
        if !(line.contains("FUNC(") || line.contains("FUNC_P2VAR(") || line.contains("FUNC_P2CONST(")) {
            continue;
        }

        for rule in rules() {
            let mut matched = None;
            for extra in 0..=MAX_CONTINUATION_LINES {
                if line_idx + extra >= line_index.line_count() {
                    break;
                }
                let (win_start, win) = line_index.window(content, line_idx, extra);
                if let Some(caps) = rule.regex.captures(win) {
                    matched = Some((win_start, caps));
                    break;
                }
            }
            let Some((win_start, caps)) = matched else {
                continue;
            };

            let name = caps.name("name").unwrap().as_str().to_string();
            let name_offset = win_start + caps.name("name").unwrap().start();
            let name_line = line_index.line_of_offset(name_offset);

            let is_static = caps.name("st").is_some();
            let raw_type = caps.name("ty").unwrap().as_str();
            let memory_class = caps.name("mc").unwrap().as_str().to_string();
            let return_type = format_return_type(raw_type, rule.return_suffix);

            let open_paren_idx = win_start + caps.get(0).unwrap().end() - 1;
            let Some(close_idx) = find_matching_paren(bytes, open_paren_idx) else {
                continue;
            };
            let params_text = &content[open_paren_idx + 1..close_idx - 1];
            let parameters = split_params_balanced(params_text)
                .iter()
                .map(|p| parse_parameter(p))
                .collect();

            results.push(RawSignature {
                name,
                name_line,
                is_static,
                return_type,
                function_type: rule.function_type,
                macro_type: Some(rule.macro_type),
                memory_class: Some(memory_class),
                parameters,
                params_end_offset: close_idx,
            });
            break;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_func_macro() {
        let content = "FUNC(void, RTE_CODE) Demo_Init(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_autosar_signatures(content, &idx);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].name, "Demo_Init");
        assert_eq!(sigs[0].return_type, "void");
        assert_eq!(sigs[0].function_type, FunctionType::AutosarFunc);
        assert_eq!(sigs[0].macro_type, Some("FUNC"));
    }

    #[test]
    fn recognizes_static_func_p2var_with_pointer_return() {
        let content = "STATIC FUNC_P2VAR(uint8, AUTOMATIC, RTE_CODE) Get_Buffer(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_autosar_signatures(content, &idx);
        assert_eq!(sigs.len(), 1);
        assert!(sigs[0].is_static);
        assert_eq!(sigs[0].return_type, "uint8*");
        assert_eq!(sigs[0].function_type, FunctionType::AutosarFuncP2Var);
    }

    #[test]
    fn recognizes_func_p2const_return_type() {
        let content = "FUNC_P2CONST(uint8, AUTOMATIC, RTE_CODE) Get_Const(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_autosar_signatures(content, &idx);
        assert_eq!(sigs[0].return_type, "const uint8*");
    }

    #[test]
    fn macro_spanning_multiple_lines_is_collected() {
        let content = "FUNC(void, RTE_CODE)\nDemo_Init(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_autosar_signatures(content, &idx);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].name, "Demo_Init");
        assert_eq!(sigs[0].name_line, 2);
    }

    #[test]
    fn void_parameter_list_yields_no_parameters() {
        let content = "FUNC(void, RTE_CODE) Demo_Init(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_autosar_signatures(content, &idx);
        assert!(sigs[0].parameters.is_empty());
    }

    #[test]
    fn parses_autosar_parameters() {
        let content =
            "FUNC(void, RTE_CODE) Demo_Write(P2CONST(uint8, AUTOMATIC, RTE_CODE) data, VAR(uint8, AUTOMATIC) len)\n{\n}\n";
        let idx = LineIndex::new(content);
        let sigs = scan_autosar_signatures(content, &idx);
        assert_eq!(sigs[0].parameters.len(), 2);
        assert_eq!(sigs[0].parameters[0].name, "data");
        assert!(sigs[0].parameters[0].is_pointer);
        assert_eq!(sigs[0].parameters[1].name, "len");
    }
}
