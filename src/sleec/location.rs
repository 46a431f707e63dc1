//! Byte offset to line number conversion for diagnostics
//!
//! Tokens carry byte ranges into the original source (comments included). Error
//! messages and the `line` fields of the AST use 1-based line numbers, computed here
//! with a binary search over the precomputed line start offsets.
//!
//! ```text
//! Source: "event A\nevent B"
//!  line_starts = [0, 8]
//!  line_of(10) -> 2
//! ```
//!
//! Line numbers are diagnostic only. Nothing in the encoding depends on them.

/// Precomputed line table for one source text
#[derive(Debug, Clone)]
pub struct SourceLocation<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceLocation<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source,
            line_starts,
        }
    }

    /// 1-based line containing the byte offset. Offsets past the end map to the last line.
    pub fn line_of(&self, byte_offset: usize) -> usize {
        let index = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        index + 1
    }

    /// The text of a 1-based line, without its line terminator
    pub fn line_text(&self, line: usize) -> &'a str {
        let Some(&start) = line.checked_sub(1).and_then(|i| self.line_starts.get(i)) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line)
            .map(|next| next.saturating_sub(1))
            .unwrap_or(self.source.len());
        self.source[start..end].trim_end_matches('\r')
    }

    /// Source text covered by a byte range, with whitespace runs collapsed to one space
    pub fn snippet(&self, range: std::ops::Range<usize>) -> String {
        let end = range.end.min(self.source.len());
        let start = range.start.min(end);
        self.source[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let loc = SourceLocation::new("event A");
        assert_eq!(loc.line_of(0), 1);
        assert_eq!(loc.line_of(6), 1);
    }

    #[test]
    fn test_multi_line() {
        let loc = SourceLocation::new("def_start\n  event A\ndef_end");
        assert_eq!(loc.line_of(0), 1);
        assert_eq!(loc.line_of(9), 1);
        assert_eq!(loc.line_of(10), 2);
        assert_eq!(loc.line_of(20), 3);
    }

    #[test]
    fn test_line_text() {
        let loc = SourceLocation::new("first\r\nsecond\nthird");
        assert_eq!(loc.line_text(1), "first");
        assert_eq!(loc.line_text(2), "second");
        assert_eq!(loc.line_text(3), "third");
        assert_eq!(loc.line_text(0), "");
        assert_eq!(loc.line_text(9), "");
    }

    #[test]
    fn test_snippet_collapses_whitespace() {
        let source = "R1 when A\n    then B";
        let loc = SourceLocation::new(source);
        assert_eq!(loc.snippet(0..source.len()), "R1 when A then B");
        assert_eq!(loc.snippet(0..999), "R1 when A then B");
    }

    #[test]
    fn test_unicode_content() {
        let loc = SourceLocation::new("// café\nevent A");
        let offset = "// café\n".len();
        assert_eq!(loc.line_of(offset), 2);
    }
}
