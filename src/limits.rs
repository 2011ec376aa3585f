//! Hard caps on pathological input.
//!
//! These keep recursion bounded and the scanners linear no matter what a
//! documentation comment contains.

/// Maximum nesting depth for block quotes (each level re-segments its body).
pub const MAX_BLOCK_NESTING: usize = 16;

/// Maximum list nesting depth; deeper items are flattened onto the deepest list.
pub const MAX_LIST_NESTING: usize = 8;

/// Maximum nesting depth for inline containers (link labels, emphasis, spans).
pub const MAX_INLINE_NESTING: usize = 16;

/// Maximum backtick run length for code spans.
/// Longer runs are treated as literal text.
pub const MAX_CODE_SPAN_BACKTICKS: usize = 16;

/// Maximum heading level recognised by the segmenter.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Maximum table columns; extra cells are folded into the last column.
pub const MAX_TABLE_COLUMNS: usize = 64;

/// Maximum length of a gtk-doc identifier after a sigil (`%`, `#`, `@`).
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Maximum bytes an inline construct may span, delimiters included.
/// Openers whose closer lies further away are literal text.
pub const MAX_INLINE_SPAN: usize = 1024;
