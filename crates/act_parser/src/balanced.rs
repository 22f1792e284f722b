/// Safety cap on how far a balanced-delimiter scan will walk before giving
/// up (§4.1.3: parameter list bounded to 0–500 chars plus one level of
/// nested parens 0–100; we give call/body scans a slightly larger, still
/// fixed, budget since they cover more ground than a parameter list).
const MAX_SCAN: usize = 4096;

/// Given the byte offset of an opening `(`, finds the offset just past its
/// matching `)`, tracking nested `()`, `[]`, `{}` (§4.1.2: "Parameters are
/// split on commas at depth 0 (with nested `()`, `[]`, `{}` tracked)").
/// Returns `None` if unbalanced within `MAX_SCAN` bytes.
pub fn find_matching_paren(bytes: &[u8], open_idx: usize) -> Option<usize> {
    debug_assert_eq!(bytes.get(open_idx), Some(&b'('));
    let mut depth: i32 = 0;
    let limit = (open_idx + MAX_SCAN).min(bytes.len());
    for i in open_idx..limit {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth -= 1;
                if depth == 0 && bytes[i] == b')' {
                    return Some(i + 1);
                }
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits the interior text of a parameter list on commas at depth 0,
/// tracking nested `()`, `[]`, `{}` so a function-pointer parameter like
/// `void (*cb)(int, int)` is not split on its inner comma.
pub fn split_params_balanced(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "void" {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0usize;
    let bytes = trimmed.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(trimmed[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = trimmed[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts.retain(|p| !p.is_empty() && p != "void");
    parts
}

/// Scans forward from `search_from` for the function body: the first `{`
/// (skipping whitespace), and its matching `}`, tracking brace nesting
/// (§4.1.4). Returns the byte range of the body's interior (after the `{`,
/// before the matching `}`). Returns `None` if no opening brace is found
/// nearby, or the closing brace is missing (empty body per §4.1.4 — "Missing
/// closing braces cause the function to have an empty body... rather than
/// rejecting the record").
pub fn find_body_range(bytes: &[u8], search_from: usize) -> Option<(usize, usize)> {
    let mut i = search_from;
    let limit = bytes.len();
    // Skip whitespace and a possible `;` is handled by the caller rejecting
    // forward-declarations before calling this.
    while i < limit && (bytes[i] as char).is_whitespace() {
        i += 1;
    }
    if i >= limit || bytes[i] != b'{' {
        return None;
    }
    let open = i;
    let mut depth: i32 = 0;
    let mut j = open;
    while j < limit {
        match bytes[j] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open + 1, j));
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_matching_paren_simple() {
        let s = b"(a, b)";
        assert_eq!(find_matching_paren(s, 0), Some(6));
    }

    #[test]
    fn finds_matching_paren_with_nested_brackets() {
        let s = b"(a[0], b)";
        assert_eq!(find_matching_paren(s, 0), Some(9));
    }

    #[test]
    fn split_params_respects_nested_parens() {
        let parts = split_params_balanced("void (*cb)(int, int), uint8 x");
        assert_eq!(parts, vec!["void (*cb)(int, int)", "uint8 x"]);
    }

    #[test]
    fn split_params_empty_or_void() {
        assert!(split_params_balanced("").is_empty());
        assert!(split_params_balanced("void").is_empty());
        assert!(split_params_balanced("  void  ").is_empty());
    }

    #[test]
    fn body_range_missing_close_brace_returns_none() {
        let s = b"{ foo(); ";
        assert_eq!(find_body_range(s, 0), None);
    }

    #[test]
    fn body_range_balances_nested_braces() {
        let s = b"{ if (x) { foo(); } }";
        let (start, end) = find_body_range(s, 0).unwrap();
        assert_eq!(&s[start..end], b" if (x) { foo(); } ");
    }
}
