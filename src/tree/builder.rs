//! Assembles segmented blocks and inline elements into the element tree.

use tracing::trace;

use crate::block::{Block, BlockParser, ListKind};
use crate::inline::{InlineContext, InlineParser, join_image_url};
use crate::limits;
use crate::Range;

use super::{Element, TableRow};

/// One list item as segmented, before nesting.
struct ListEntry {
    indent: u32,
    kind: ListKind,
    text: String,
}

/// Builds an element tree for one document.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    inline: InlineParser<'a>,
    depth: usize,
}

fn join_lines(input: &str, lines: &[Range]) -> String {
    let mut text = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(line.slice(input));
    }
    text
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for the given translation context.
    pub fn new(ctx: InlineContext<'a>) -> Self {
        Self {
            inline: InlineParser::new(ctx),
            depth: 0,
        }
    }

    /// Segment and parse `input` into block-level elements.
    pub fn build(&self, input: &str) -> Vec<Element> {
        let blocks: Vec<Block> = BlockParser::new(input).collect();
        let mut elements = Vec::new();
        let mut i = 0;

        while i < blocks.len() {
            match &blocks[i] {
                Block::Paragraph { lines } => {
                    let children = self.inline.parse(&join_lines(input, lines));
                    if !children.is_empty() {
                        elements.push(Element::Paragraph(children));
                    }
                    i += 1;
                }
                Block::Heading { level, text } => {
                    elements.push(Element::Heading {
                        level: *level,
                        children: self.inline.parse(text.slice(input)),
                    });
                    i += 1;
                }
                Block::ListItem { .. } => {
                    let (entries, next) = collect_list_entries(input, &blocks, i);
                    elements.extend(self.build_lists(&entries, 0));
                    i = next;
                }
                Block::CodeFence { language, lines, .. } => {
                    elements.push(code_block(input, *language, lines));
                    i += 1;
                }
                Block::TableRow { .. } => {
                    let (rows, next) = self.collect_table(input, &blocks, i);
                    if !rows.is_empty() {
                        elements.push(Element::Table { rows });
                    }
                    i = next;
                }
                Block::Picture { src, alt } => {
                    if let Some(src) = src {
                        let alt = alt.map(|alt| alt.slice(input).trim()).filter(|alt| !alt.is_empty());
                        elements.push(Element::Paragraph(vec![Element::Image {
                            src: join_image_url(self.inline.context().image_base_url, src.slice(input)),
                            alt: alt.map(str::to_string),
                        }]));
                    } else {
                        trace!("picture without <img> dropped");
                    }
                    i += 1;
                }
                Block::BlockQuote { lines } => {
                    let quoted = join_lines(input, lines);
                    let children = if self.depth + 1 >= limits::MAX_BLOCK_NESTING {
                        vec![Element::Paragraph(self.inline.parse(&quoted))]
                    } else {
                        let nested = Self {
                            inline: self.inline,
                            depth: self.depth + 1,
                        };
                        nested.build(&quoted)
                    };
                    elements.push(Element::BlockQuote(children));
                    i += 1;
                }
                Block::Blank => i += 1,
            }
        }

        elements
    }

    /// Translate a run of table rows starting at `start`.
    fn collect_table(&self, input: &str, blocks: &[Block], start: usize) -> (Vec<TableRow>, usize) {
        let mut rows: Vec<TableRow> = Vec::new();
        let mut i = start;

        while let Some(Block::TableRow { cells, separator }) = blocks.get(i) {
            if *separator {
                // Marks the row above as a header; drawn as an `=` border
                match rows.last_mut() {
                    Some(last) => last.header = true,
                    None => rows.push(TableRow {
                        cells: vec![Vec::new(); cells.len()],
                        header: true,
                    }),
                }
            } else {
                rows.push(TableRow {
                    cells: cells
                        .iter()
                        .map(|cell| self.inline.parse(cell.slice(input)))
                        .collect(),
                    header: false,
                });
            }
            i += 1;
        }

        (rows, i)
    }

    /// Nest a flat run of list items by indentation.
    fn build_lists(&self, entries: &[ListEntry], depth: usize) -> Vec<Element> {
        let mut lists = Vec::new();
        let mut current: Option<(ListKind, Vec<Element>)> = None;
        let mut i = 0;

        while i < entries.len() {
            let entry = &entries[i];
            let mut next = i + 1;
            while next < entries.len() && entries[next].indent > entry.indent {
                next += 1;
            }

            let mut children = Vec::new();
            let paragraph = self.inline.parse(&entry.text);
            if !paragraph.is_empty() {
                children.push(Element::Paragraph(paragraph));
            }
            let nested = &entries[i + 1..next];
            if !nested.is_empty() {
                if depth + 1 < limits::MAX_LIST_NESTING {
                    children.extend(self.build_lists(nested, depth + 1));
                } else {
                    children.extend(
                        nested
                            .iter()
                            .map(|entry| Element::Paragraph(self.inline.parse(&entry.text))),
                    );
                }
            }

            match current.as_mut() {
                Some((kind, items)) if kind.same_family(entry.kind) => {
                    items.push(Element::ListItem(children));
                }
                _ => {
                    if let Some((kind, items)) = current.take() {
                        lists.push(Element::List { kind, items });
                    }
                    current = Some((entry.kind, vec![Element::ListItem(children)]));
                }
            }
            i = next;
        }

        if let Some((kind, items)) = current {
            lists.push(Element::List { kind, items });
        }
        lists
    }
}

/// Collect consecutive list items, looking across blank lines.
fn collect_list_entries(input: &str, blocks: &[Block], start: usize) -> (Vec<ListEntry>, usize) {
    let mut entries = Vec::new();
    let mut i = start;

    loop {
        match blocks.get(i) {
            Some(Block::ListItem {
                indent,
                kind,
                lines,
            }) => {
                entries.push(ListEntry {
                    indent: *indent,
                    kind: *kind,
                    text: join_lines(input, lines),
                });
                i += 1;
            }
            Some(Block::Blank) if matches!(blocks.get(i + 1), Some(Block::ListItem { .. })) => {
                i += 1;
            }
            _ => break,
        }
    }

    (entries, i)
}

/// Build a code block, dropping blank lines around the content.
fn code_block(input: &str, language: Option<Range>, lines: &[Range]) -> Element {
    let is_blank = |line: &Range| line.slice(input).trim().is_empty();
    let first = lines.iter().position(|line| !is_blank(line)).unwrap_or(lines.len());
    let last = lines.iter().rposition(|line| !is_blank(line)).map_or(first, |pos| pos + 1);

    Element::CodeBlock {
        language: language.map(|lang| lang.slice(input).to_string()),
        lines: lines[first..last]
            .iter()
            .map(|line| line.slice(input).trim_end().to_string())
            .collect(),
    }
}
