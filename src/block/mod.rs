//! Block-level segmenter for gtk-doc markup.
//!
//! The segmenter is line-oriented and recognises:
//! - `#` headings
//! - Code fences (three backticks and `|[ ... ]|`)
//! - `<picture>` elements
//! - Pipe tables
//! - Block quotes
//! - List items
//! - Paragraphs

mod event;
mod parser;

pub use event::{Block, FenceKind, ListKind};
pub use parser::BlockParser;
