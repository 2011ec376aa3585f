//! Byte cursor for the line-oriented block segmenter.
//!
//! Every construct the translator recognises is delimited by ASCII bytes, so
//! scanning happens on the byte view of a `&str` and every offset a cursor
//! hands out is a valid char boundary of that string.

use crate::Range;

/// A cursor for byte-by-byte scanning of UTF-8 text.
///
/// # Example
/// ```
/// use gtkdoc_rst::cursor::Cursor;
///
/// let input = "|[  code\nmore";
/// let mut cursor = Cursor::new_at(input, 2);
/// cursor.skip_whitespace();
/// assert!(cursor.at_bytes(b"code"));
/// assert_eq!(cursor.consume_line().slice(input), "code");
/// assert_eq!(cursor.offset(), 9);
/// ```
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of `input`.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self::new_at(input, 0)
    }

    /// Create a cursor starting at an offset.
    #[inline]
    pub fn new_at(input: &'a str, offset: usize) -> Self {
        debug_assert!(offset <= input.len());
        Self {
            input: input.as_bytes(),
            pos: offset.min(input.len()),
        }
    }

    /// Current offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Check if the remaining input starts with `bytes`.
    #[inline]
    pub fn at_bytes(&self, bytes: &[u8]) -> bool {
        self.input[self.pos..].starts_with(bytes)
    }

    /// Skip spaces and tabs, returning the number of bytes skipped.
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.input.get(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Advance past the next newline, returning the range of the line.
    ///
    /// The range excludes the newline and a trailing `\r`.
    #[inline]
    pub fn consume_line(&mut self) -> Range {
        let start = self.pos;
        let (end, next) = match memchr::memchr(b'\n', &self.input[start..]) {
            Some(pos) => (start + pos, start + pos + 1),
            None => (self.input.len(), self.input.len()),
        };
        self.pos = next;
        let end = if end > start && self.input[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        Range::from_usize(start, end)
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset())
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_new() {
        let cursor = Cursor::new("Hello");
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.remaining(), 5);
        assert!(!cursor.is_eof());
    }

    #[test]
    fn test_cursor_empty() {
        let mut cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert!(cursor.consume_line().is_empty());
    }

    #[test]
    fn test_cursor_skip_whitespace() {
        let mut cursor = Cursor::new(" \t abc");
        assert_eq!(cursor.skip_whitespace(), 3);
        assert!(cursor.at_bytes(b"abc"));
        assert_eq!(cursor.skip_whitespace(), 0);
    }

    #[test]
    fn test_cursor_consume_line() {
        let input = "line1\r\nline2\n\nline3";
        let mut cursor = Cursor::new(input);
        assert_eq!(cursor.consume_line().slice(input), "line1");
        assert_eq!(cursor.consume_line().slice(input), "line2");
        assert_eq!(cursor.consume_line().slice(input), "");
        assert_eq!(cursor.consume_line().slice(input), "line3");
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_cursor_trailing_newline() {
        let input = "a\n";
        let mut cursor = Cursor::new(input);
        assert_eq!(cursor.consume_line().slice(input), "a");
        assert!(cursor.is_eof());
    }
}
