//! Source buffer handling.
//!
//! [`SourceBuffer`] owns the text being executed and hands out the line
//! slices diagnostics embed in their rendering. Tab expansion happens here
//! so that column numbers always refer to the expanded text.

/// The source text for one execution (a file, or one REPL block).
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    /// Wrap already-expanded source text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wrap source text, expanding each tab to four spaces first.
    pub fn with_expanded_tabs(text: &str) -> Self {
        Self { text: text.replace('\t', "    ") }
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `line_no`-th line (0-based), without its trailing newline.
    /// Out-of-range lines come back empty rather than panicking, since this
    /// only feeds diagnostic rendering.
    pub fn line(&self, line_no: usize) -> &str {
        self.text.split('\n').nth(line_no).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_extraction() {
        let src = SourceBuffer::new("num x = 1\nprint(x)\n");
        assert_eq!(src.line(0), "num x = 1");
        assert_eq!(src.line(1), "print(x)");
        assert_eq!(src.line(9), "");
    }

    #[test]
    fn tabs_expand_to_four_spaces() {
        let src = SourceBuffer::with_expanded_tabs("\tnum x = 1");
        assert_eq!(src.line(0), "    num x = 1");
    }
}
