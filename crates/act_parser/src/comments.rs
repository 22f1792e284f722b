/// Replaces `/* ... */` (including multi-line) and `// ... EOL` comments
/// with whitespace of the same length, so line numbers (and byte offsets
/// within a line) are preserved for later position-to-line-number
/// computation (§4.1.4).
pub fn strip_comments(src: &str) -> String {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut out: Vec<u8> = Vec::with_capacity(len);
    let mut i = 0;
    let mut in_string: Option<u8> = None; // active string/char quote, if any

    while i < len {
        let b = bytes[i];

        if let Some(quote) = in_string {
            out.push(b);
            if b == b'\\' && i + 1 < len {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if b == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        if b == b'"' || b == b'\'' {
            in_string = Some(b);
            out.push(b);
            i += 1;
            continue;
        }

        if b == b'/' && i + 1 < len && bytes[i + 1] == b'/' {
            while i < len && bytes[i] != b'\n' {
                out.push(b' ');
                i += 1;
            }
            continue;
        }

        if b == b'/' && i + 1 < len && bytes[i + 1] == b'*' {
            out.push(b' ');
            out.push(b' ');
            i += 2;
            while i < len {
                if bytes[i] == b'*' && i + 1 < len && bytes[i + 1] == b'/' {
                    out.push(b' ');
                    out.push(b' ');
                    i += 2;
                    break;
                }
                out.push(if bytes[i] == b'\n' { b'\n' } else { b' ' });
                i += 1;
            }
            continue;
        }

        out.push(b);
        i += 1;
    }

    // Safety: we only ever replace bytes one-for-one with ASCII spaces and
    // never split a multi-byte UTF-8 sequence (non-ASCII bytes are copied
    // through untouched in all branches above), so `out` stays valid UTF-8.
    String::from_utf8(out).unwrap_or_default()
}
