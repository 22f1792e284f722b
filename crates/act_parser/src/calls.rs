use std::collections::HashMap;

use act_types::FunctionCall;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::balanced::find_matching_paren;
use crate::keywords::is_non_call_identifier;

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleans a raw guard/condition string per §4.1.7: strip outer whitespace;
/// drop a trailing `{`; reject (return empty) if parens are still
/// unbalanced; strip `#`-line artifacts; collapse whitespace runs.
fn sanitize_condition(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    if let Some(stripped) = text.strip_suffix('{') {
        text = stripped.trim_end().to_string();
    }

    let cleaned: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ");

    let collapsed = WHITESPACE_RUN_RE.replace_all(cleaned.trim(), " ").to_string();

    let mut depth = 0i32;
    for c in collapsed.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return String::new();
        }
    }
    if depth != 0 {
        return String::new();
    }
    collapsed
}

/// Splits the interior of a `for (...)` clause on `;` at depth 0.
fn split_semicolons_balanced(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b';' if depth == 0 => {
                parts.push(text[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].to_string());
    parts
}

fn is_word_at(bytes: &[u8], pos: usize, word: &str) -> bool {
    let wb = word.as_bytes();
    if pos + wb.len() > bytes.len() || &bytes[pos..pos + wb.len()] != wb {
        return false;
    }
    let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
    let after = pos + wb.len();
    let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
    before_ok && after_ok
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn skip_ws(bytes: &[u8], mut pos: usize, end: usize) -> usize {
    while pos < end && (bytes[pos] as char).is_whitespace() {
        pos += 1;
    }
    pos
}

struct Ctx<'a> {
    body: &'a str,
    bytes: &'a [u8],
    calls: Vec<FunctionCall>,
    call_index: HashMap<String, usize>,
    cond_stack: Vec<String>,
    loop_stack: Vec<String>,
}

impl<'a> Ctx<'a> {
    fn record_call(&mut self, name: &str) {
        let mut call = FunctionCall::new(name);
        if let Some(cond) = self.cond_stack.last() {
            call.is_conditional = true;
            call.condition = Some(cond.clone());
        }
        if let Some(lc) = self.loop_stack.last() {
            call.is_loop = true;
            call.loop_condition = Some(lc.clone());
        }

        if let Some(&idx) = self.call_index.get(name) {
            self.calls[idx].merge(&call);
        } else {
            self.call_index.insert(name.to_string(), self.calls.len());
            self.calls.push(call);
        }
    }

    /// Parses a parenthesized guard starting at `paren_idx` (the byte offset
    /// of the `(`). Returns (sanitized condition text, offset just past the
    /// closing `)`), or `None` if unbalanced.
    fn parse_guard(&self, paren_idx: usize) -> Option<(String, usize)> {
        let close = find_matching_paren(self.bytes, paren_idx)?;
        let raw = &self.body[paren_idx + 1..close - 1];
        Some((sanitize_condition(raw), close))
    }

    /// Scans `[start, end)` as a sequence of statements (a block's
    /// contents), tracking brace nesting locally.
    fn scan_block(&mut self, start: usize, end: usize) {
        let mut pos = start;
        while pos < end {
            pos = self.scan_one_stmt_or_token(pos, end);
        }
    }

    /// Consumes exactly one "thing" starting at `pos`: a control-flow
    /// construct, a nested block, a plain call, or a single other token/byte.
    /// This single primitive is shared between block-content scanning and
    /// single (brace-less) substatement scanning — a substatement is simply
    /// "the first thing scan_one_stmt_or_token consumes from a position where
    /// a statement is expected".
    fn scan_one_stmt_or_token(&mut self, pos: usize, end: usize) -> usize {
        let bytes = self.bytes;
        if pos >= end {
            return end;
        }
        let b = bytes[pos];

        if b.is_ascii_alphabetic() || b == b'_' {
            let word_start = pos;
            let mut p = pos;
            while p < end && is_ident_byte(bytes[p]) {
                p += 1;
            }
            let word = &self.body[word_start..p];

            return match word {
                "if" => self.handle_if(p, end),
                "else" => self.handle_else(p, end),
                "for" => self.handle_for(p, end),
                "while" => self.handle_while(p, end),
                _ => {
                    let after_ws = skip_ws(bytes, p, end);
                    if after_ws < end && bytes[after_ws] == b'(' {
                        if !is_non_call_identifier(word) {
                            self.record_call(word);
                        }
                    }
                    p
                }
            };
        }

        if b == b'{' {
            if let Some(close) = find_matching_paren_brace(bytes, pos) {
                self.scan_block(pos + 1, close);
                return close + 1;
            }
            return end;
        }

        pos + 1
    }

    /// Consumes exactly one substatement (used for brace-less `if`/`for`/
    /// `while` bodies) starting at `pos`, returning the position just past
    /// it. A substatement is either a nested control construct (handled
    /// recursively, so `if (x) if (y) foo();` works), a brace block, or an
    /// ordinary statement terminated by `;` at depth 0.
    fn scan_one_substatement(&mut self, pos: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, pos, end);
        if pos >= end {
            return end;
        }
        let bytes = self.bytes;
        let b = bytes[pos];

        if b.is_ascii_alphabetic() || b == b'_' {
            let mut p = pos;
            while p < end && is_ident_byte(bytes[p]) {
                p += 1;
            }
            let word = &self.body[pos..p];
            match word {
                "if" => return self.handle_if(p, end),
                "else" => return self.handle_else(p, end),
                "for" => return self.handle_for(p, end),
                "while" => return self.handle_while(p, end),
                _ => {}
            }
        }
        if b == b'{' {
            if let Some(close) = find_matching_paren_brace(bytes, pos) {
                self.scan_block(pos + 1, close);
                return close + 1;
            }
            return end;
        }

        // Ordinary statement: scan to the next top-level `;`, recording any
        // plain calls encountered along the way.
        let mut depth = 0i32;
        let mut p = pos;
        while p < end {
            let c = bytes[p];
            if c.is_ascii_alphabetic() || c == b'_' {
                let word_start = p;
                while p < end && is_ident_byte(bytes[p]) {
                    p += 1;
                }
                let word = &self.body[word_start..p];
                let after_ws = skip_ws(bytes, p, end);
                if after_ws < end && bytes[after_ws] == b'(' && depth == 0 && !is_non_call_identifier(word) {
                    self.record_call(word);
                }
                continue;
            }
            match c {
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth -= 1,
                b';' if depth <= 0 => return p + 1,
                _ => {}
            }
            p += 1;
        }
        p
    }

    fn handle_if(&mut self, after_kw: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, after_kw, end);
        if pos >= end || self.bytes[pos] != b'(' {
            return after_kw;
        }
        let Some((cond, after_paren)) = self.parse_guard(pos) else {
            return after_paren_fallback(self.bytes, pos, end);
        };
        self.push_and_run(Stack::Cond, cond, after_paren, end)
    }

    fn handle_else(&mut self, after_kw: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, after_kw, end);
        if is_word_at(self.bytes, pos, "if") {
            // `else if (...)` behaves exactly like a fresh `if`.
            return self.handle_if(pos + 2, end);
        }
        self.push_and_run(Stack::Cond, "else".to_string(), pos, end)
    }

    fn handle_for(&mut self, after_kw: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, after_kw, end);
        if pos >= end || self.bytes[pos] != b'(' {
            return after_kw;
        }
        let Some(close) = find_matching_paren(self.bytes, pos) else {
            return after_paren_fallback(self.bytes, pos, end);
        };
        let raw = &self.body[pos + 1..close - 1];
        let parts = split_semicolons_balanced(raw);
        let cond = if parts.len() == 3 {
            sanitize_condition(&parts[1])
        } else {
            // Malformed/unusual loop header: push nothing, still consume it.
            return self.run_body_without_context(close, end);
        };
        self.push_and_run(Stack::Loop, cond, close, end)
    }

    fn handle_while(&mut self, after_kw: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, after_kw, end);
        if pos >= end || self.bytes[pos] != b'(' {
            return after_kw;
        }
        let Some((cond, after_paren)) = self.parse_guard(pos) else {
            return after_paren_fallback(self.bytes, pos, end);
        };
        self.push_and_run(Stack::Loop, cond, after_paren, end)
    }

    /// Pushes `cond` onto the relevant stack, then runs either the brace
    /// block or the single substatement that follows, popping afterward.
    fn push_and_run(&mut self, which: Stack, cond: String, after_guard: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, after_guard, end);
        let has_brace = pos < end && self.bytes[pos] == b'{';

        match which {
            Stack::Cond => self.cond_stack.push(cond),
            Stack::Loop => self.loop_stack.push(cond),
        }

        let result = if has_brace {
            match find_matching_paren_brace(self.bytes, pos) {
                Some(close) => {
                    self.scan_block(pos + 1, close);
                    close + 1
                }
                None => end,
            }
        } else {
            self.scan_one_substatement(after_guard, end)
        };

        match which {
            Stack::Cond => {
                self.cond_stack.pop();
            }
            Stack::Loop => {
                self.loop_stack.pop();
            }
        }
        result
    }

    /// A malformed loop header (`for`/`while`): don't push any context, but
    /// still consume whatever block or statement follows so scanning can
    /// continue.
    fn run_body_without_context(&mut self, after_guard: usize, end: usize) -> usize {
        let pos = skip_ws(self.bytes, after_guard, end);
        if pos < end && self.bytes[pos] == b'{' {
            if let Some(close) = find_matching_paren_brace(self.bytes, pos) {
                self.scan_block(pos + 1, close);
                return close + 1;
            }
            return end;
        }
        self.scan_one_substatement(after_guard, end)
    }
}

enum Stack {
    Cond,
    Loop,
}

fn after_paren_fallback(bytes: &[u8], paren_idx: usize, end: usize) -> usize {
    (paren_idx + 1).min(end)
}

fn find_matching_paren_brace(bytes: &[u8], open_idx: usize) -> Option<usize> {
    debug_assert_eq!(bytes.get(open_idx), Some(&b'{'));
    let mut depth = 0i32;
    for (offset, &b) in bytes.iter().enumerate().skip(open_idx) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts all call sites from a function body, enriched with conditional
/// and loop context (§4.1.6).
pub fn extract_calls(body: &str) -> Vec<FunctionCall> {
    let mut ctx = Ctx {
        body,
        bytes: body.as_bytes(),
        calls: Vec::new(),
        call_index: HashMap::new(),
        cond_stack: Vec::new(),
        loop_stack: Vec::new(),
    };
    let end = ctx.bytes.len();
    ctx.scan_block(0, end);
    ctx.calls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_calls_in_order() {
        let body = " HW_InitHardware(); SW_InitSoftware(); COM_InitCommunication(); Demo_InitVariables(); ";
        let calls = extract_calls(body);
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "HW_InitHardware",
                "SW_InitSoftware",
                "COM_InitCommunication",
                "Demo_InitVariables"
            ]
        );
        assert!(calls.iter().all(|c| !c.is_conditional && !c.is_loop));
    }

    #[test]
    fn conditional_propagation() {
        let body = " if (0x05 > 0x00) { Demo_Update(0x05); } ";
        let calls = extract_calls(body);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_conditional);
        assert_eq!(calls[0].condition.as_deref(), Some("0x05 > 0x00"));
    }

    #[test]
    fn loop_propagation_for() {
        let body = " for (i=0;i<10;i++) { Process_Element(); } ";
        let calls = extract_calls(body);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_loop);
        assert_eq!(calls[0].loop_condition.as_deref(), Some("i<10"));
    }

    #[test]
    fn loop_propagation_while() {
        let body = " while (Has_More()) { Process_Element(); } ";
        let calls = extract_calls(body);
        let process = calls.iter().find(|c| c.name == "Process_Element").unwrap();
        assert!(process.is_loop);
        assert_eq!(process.loop_condition.as_deref(), Some("Has_More()"));
    }

    #[test]
    fn single_statement_if_without_braces_gets_context() {
        let body = " if (x > 0) Demo_Update(x); ";
        let calls = extract_calls(body);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_conditional);
        assert_eq!(calls[0].condition.as_deref(), Some("x > 0"));
    }

    #[test]
    fn else_if_chain_uses_its_own_guard() {
        let body = " if (a) { Foo(); } else if (b) { Bar(); } else { Baz(); } ";
        let calls = extract_calls(body);
        let foo = calls.iter().find(|c| c.name == "Foo").unwrap();
        let bar = calls.iter().find(|c| c.name == "Bar").unwrap();
        let baz = calls.iter().find(|c| c.name == "Baz").unwrap();
        assert_eq!(foo.condition.as_deref(), Some("a"));
        assert_eq!(bar.condition.as_deref(), Some("b"));
        assert_eq!(baz.condition.as_deref(), Some("else"));
    }

    #[test]
    fn duplicate_calls_are_merged_with_most_recent_context() {
        let body = " if (a) { Shared(); } if (b) { Shared(); } ";
        let calls = extract_calls(body);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].condition.as_deref(), Some("b"));
    }

    #[test]
    fn filters_keywords_and_primitive_types_and_literal_macros() {
        let body = " if (x) { } for (;;) { } uint8 y = INT32_C(5); Real_Call(); ";
        let calls = extract_calls(body);
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Real_Call"]);
    }

    #[test]
    fn nested_if_without_braces_chains_correctly() {
        let body = " if (a) if (b) Deep_Call(); ";
        let calls = extract_calls(body);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_conditional);
        assert_eq!(calls[0].condition.as_deref(), Some("b"));
    }
}
