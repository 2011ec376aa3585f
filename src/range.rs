//! Compact range representation for zero-copy text references.
//!
//! Block payloads (heading text, code lines, table cells) are ranges into
//! the input rather than owned strings. `u32` offsets keep a range at 8 bytes.

/// Compact range into an input buffer.
///
/// # Example
/// ```
/// use gtkdoc_rst::Range;
///
/// let input = "Hello, World!";
/// let range = Range::from_usize(0, 5);
/// assert_eq!(range.slice(input), "Hello");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

const _: () = assert!(std::mem::size_of::<Range>() == 8);

impl Range {
    /// Create a range from usize values.
    ///
    /// # Panics
    /// Panics in debug mode if values exceed u32::MAX.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(end <= u32::MAX as usize);
        debug_assert!(start <= end);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// The text this range refers to.
    ///
    /// Ranges produced by the scanners always sit on ASCII delimiters, so they
    /// are valid char boundaries of `input`.
    #[inline]
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start_usize()..self.end_usize()]
    }

    /// Check if the range is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Start position as usize.
    #[inline]
    pub const fn start_usize(&self) -> usize {
        self.start as usize
    }

    /// End position as usize.
    #[inline]
    pub const fn end_usize(&self) -> usize {
        self.end as usize
    }
}
