use act_types::Parameter;
use once_cell::sync::Lazy;
use regex::Regex;

// Whitespace around commas/parens inside these macros is arbitrary (§4.1.1),
// hence the liberal `\s*` around every delimiter.
static VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*VAR\s*\(\s*([^,()]{1,100}?)\s*,\s*([^,()]{1,100}?)\s*\)\s*(\S{1,50})\s*$")
        .unwrap()
});
static CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*CONST\s*\(\s*([^,()]{1,100}?)\s*,\s*([^,()]{1,100}?)\s*\)\s*(\S{1,50})\s*$")
        .unwrap()
});
static P2VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^\s*P2VAR\s*\(\s*([^,()]{1,100}?)\s*,\s*([^,()]{1,100}?)\s*,\s*([^,()]{1,100}?)\s*\)\s*(\S{1,50})\s*$",
    )
    .unwrap()
});
static P2CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^\s*P2CONST\s*\(\s*([^,()]{1,100}?)\s*,\s*([^,()]{1,100}?)\s*,\s*([^,()]{1,100}?)\s*\)\s*(\S{1,50})\s*$",
    )
    .unwrap()
});

/// Parses one already-comma-split parameter string, recognizing the four
/// AUTOSAR parameter macros first and falling through to traditional-C
/// splitting (§4.1.1).
pub fn parse_parameter(raw: &str) -> Parameter {
    let raw = raw.trim();

    if let Some(caps) = P2VAR_RE.captures(raw) {
        return Parameter::new(caps[4].to_string(), caps[1].trim().to_string())
            .with_pointer(true)
            .with_const(false)
            .with_memory_class(Some(caps[3].trim().to_string()));
    }
    if let Some(caps) = P2CONST_RE.captures(raw) {
        return Parameter::new(caps[4].to_string(), caps[1].trim().to_string())
            .with_pointer(true)
            .with_const(true)
            .with_memory_class(Some(caps[3].trim().to_string()));
    }
    if let Some(caps) = VAR_RE.captures(raw) {
        return Parameter::new(caps[3].to_string(), caps[1].trim().to_string())
            .with_pointer(false)
            .with_const(false)
            .with_memory_class(Some(caps[2].trim().to_string()));
    }
    if let Some(caps) = CONST_RE.captures(raw) {
        return Parameter::new(caps[3].to_string(), caps[1].trim().to_string())
            .with_pointer(false)
            .with_const(true)
            .with_memory_class(Some(caps[2].trim().to_string()));
    }

    parse_traditional_parameter(raw)
}

/// Traditional-C fallback: split on the rightmost whitespace into
/// `type`/`name`, detect a trailing `*` as pointer, detect a leading
/// `const` token (§4.1.1).
fn parse_traditional_parameter(raw: &str) -> Parameter {
    let mut text = raw.trim().to_string();

    let is_const = if let Some(rest) = text.strip_prefix("const") {
        if rest.starts_with(char::is_whitespace) {
            text = rest.trim_start().to_string();
            true
        } else {
            false
        }
    } else {
        false
    };

    let (mut param_type, mut name) = match text.rfind(char::is_whitespace) {
        Some(idx) => (text[..idx].trim().to_string(), text[idx..].trim().to_string()),
        None => (text.clone(), String::new()),
    };

    let mut is_pointer = false;
    while let Some(stripped) = name.strip_prefix('*') {
        is_pointer = true;
        name = stripped.to_string();
    }
    while param_type.ends_with('*') {
        is_pointer = true;
        param_type.pop();
        param_type = param_type.trim_end().to_string();
    }

    Parameter::new(name, param_type)
        .with_pointer(is_pointer)
        .with_const(is_const)
}
