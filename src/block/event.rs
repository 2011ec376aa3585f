//! Block-level units produced by the segmenter.

use smallvec::SmallVec;

use crate::Range;

/// Type of list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Unordered list (bullet points).
    Unordered {
        /// Marker character (`-`, `*` or `+`).
        marker: u8,
    },
    /// Ordered list with item number and delimiter.
    Ordered {
        /// Number written in front of the item.
        number: u32,
        /// Delimiter character ('.' or ')').
        delimiter: u8,
    },
}

impl ListKind {
    /// Whether two markers belong to the same list.
    pub fn same_family(self, other: ListKind) -> bool {
        matches!(
            (self, other),
            (ListKind::Unordered { .. }, ListKind::Unordered { .. })
                | (ListKind::Ordered { .. }, ListKind::Ordered { .. })
        )
    }
}

/// Which syntax opened a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    /// Markdown fence: three backticks.
    Backticks,
    /// gtk-doc fence: `|[` ... `]|`.
    Pipe,
}

/// Blocks emitted by the segmenter, in source order.
///
/// Payloads are ranges into the segmented input; they never outlive one
/// translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A run of prose lines, leading indentation removed.
    Paragraph {
        /// One range per physical line.
        lines: SmallVec<[Range; 4]>,
    },

    /// A `#`-style heading. Never spans lines.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Title text.
        text: Range,
    },

    /// One list item: the text after the marker plus its continuation lines.
    ListItem {
        /// Column of the marker; deeper items nest under shallower ones.
        indent: u32,
        /// Marker kind.
        kind: ListKind,
        /// First line is the text after the marker.
        lines: SmallVec<[Range; 4]>,
    },

    /// A fenced code block, content verbatim.
    CodeFence {
        /// Opening syntax.
        fence: FenceKind,
        /// Language annotation, if any.
        language: Option<Range>,
        /// Raw lines with their original indentation.
        lines: Vec<Range>,
    },

    /// One pipe-delimited table row.
    TableRow {
        /// Trimmed raw cell texts.
        cells: SmallVec<[Range; 8]>,
        /// Every cell is a run of hyphens: the rows above are a header.
        separator: bool,
    },

    /// A raw HTML `<picture>` element reduced to its first `<img>`.
    Picture {
        /// The `src` attribute of the first `<img>`.
        src: Option<Range>,
        /// The `alt` attribute of that `<img>`.
        alt: Option<Range>,
    },

    /// Lines prefixed with `>`, prefix removed.
    BlockQuote {
        /// Quoted lines.
        lines: Vec<Range>,
    },

    /// One or more blank source lines.
    Blank,
}
