/// Maps byte offsets in a file's content to 1-based line numbers, and gives
/// windowed substrings starting at a given line for multi-line signature
/// collection (§4.1.5) without ever re-scanning the whole file with one
/// pattern (§4.1.3).
pub struct LineIndex {
    /// Byte offset of the start of each line; `starts[0] == 0`.
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = vec![0usize];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        LineIndex {
            starts,
            len: content.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// 1-based line number containing byte offset `offset`.
    pub fn line_of_offset(&self, offset: usize) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(idx) => (idx + 1) as u32,
            Err(idx) => idx as u32, // idx-1+1
        }
    }

    /// Byte range `[start, end)` of line `idx` (0-based), end exclusive and
    /// not including the trailing newline.
    pub fn line_range(&self, idx: usize, content: &str) -> (usize, usize) {
        let start = self.starts[idx];
        let end = if idx + 1 < self.starts.len() {
            let mut e = self.starts[idx + 1];
            if e > start && content.as_bytes()[e - 1] == b'\n' {
                e -= 1;
                if e > start && content.as_bytes()[e - 1] == b'\r' {
                    e -= 1;
                }
            }
            e
        } else {
            self.len
        };
        (start, end)
    }

    /// Byte offset where line `idx` (0-based) begins.
    pub fn line_start(&self, idx: usize) -> usize {
        self.starts[idx]
    }

    /// A window spanning from the start of line `from_idx` to the end of
    /// line `from_idx + extra_lines` (clamped to EOF), as a `&str` slice of
    /// `content` — so any match offset inside the returned slice is also a
    /// valid offset into `content` once added to the window's start.
    pub fn window<'a>(&self, content: &'a str, from_idx: usize, extra_lines: usize) -> (usize, &'a str) {
        let start = self.starts[from_idx];
        let end_idx = (from_idx + extra_lines + 1).min(self.starts.len());
        let end = if end_idx < self.starts.len() {
            self.starts[end_idx]
        } else {
            self.len
        };
        (start, &content[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_offsets_to_line_numbers() {
        let content = "aaa\nbbb\nccc\n";
        let idx = LineIndex::new(content);
        assert_eq!(idx.line_of_offset(0), 1);
        assert_eq!(idx.line_of_offset(4), 2);
        assert_eq!(idx.line_of_offset(8), 3);
    }

    #[test]
    fn window_offsets_map_back_into_content() {
        let content = "FUNC(void, RTE_CODE)\nDemo_Init(void)\n{\n}\n";
        let idx = LineIndex::new(content);
        let (win_start, win) = idx.window(content, 0, 2);
        let local_offset = win.find("Demo_Init").unwrap();
        let absolute = win_start + local_offset;
        assert_eq!(&content[absolute..absolute + 9], "Demo_Init");
    }
}
