//! Block segmenter implementation.

use std::collections::VecDeque;

use smallvec::SmallVec;
use tracing::trace;

use crate::Range;
use crate::cursor::Cursor;
use crate::limits;

use super::event::{Block, FenceKind, ListKind};

/// State for an open code fence.
#[derive(Debug)]
struct FenceState {
    fence: FenceKind,
    language: Option<Range>,
    lines: Vec<Range>,
}

/// State for an open `<picture>` element.
#[derive(Debug, Default)]
struct PictureState {
    src: Option<Range>,
    alt: Option<Range>,
}

/// State for a list item still accepting continuation lines.
#[derive(Debug)]
struct ListItemState {
    indent: u32,
    kind: ListKind,
    lines: SmallVec<[Range; 4]>,
}

/// Line-oriented block segmenter.
///
/// A single forward pass over the input; blocks are produced lazily through
/// the [`Iterator`] implementation.
pub struct BlockParser<'a> {
    /// Input text.
    input: &'a str,
    /// Current line cursor.
    cursor: Cursor<'a>,
    /// Accumulated paragraph lines.
    paragraph_lines: SmallVec<[Range; 4]>,
    /// Open list item, if any.
    list_item: Option<ListItemState>,
    /// Open block quote lines, if any.
    quote_lines: Option<Vec<Range>>,
    /// Open code fence, if inside one.
    fence_state: Option<FenceState>,
    /// Open picture element, if inside one.
    picture_state: Option<PictureState>,
    /// Blocks ready to be handed out.
    pending: VecDeque<Block>,
    /// Whether the last emitted block was blank (or nothing was emitted yet).
    after_blank: bool,
    finished: bool,
}

impl<'a> BlockParser<'a> {
    /// Create a new block parser.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: Cursor::new(input),
            paragraph_lines: SmallVec::new(),
            list_item: None,
            quote_lines: None,
            fence_state: None,
            picture_state: None,
            pending: VecDeque::new(),
            after_blank: true,
            finished: false,
        }
    }

    /// Parse all remaining blocks into `blocks`.
    pub fn parse(&mut self, blocks: &mut Vec<Block>) {
        blocks.extend(self);
    }

    fn emit(&mut self, block: Block) {
        if block == Block::Blank {
            if self.after_blank {
                return;
            }
            self.after_blank = true;
        } else {
            self.after_blank = false;
        }
        trace!(?block, "segmented block");
        self.pending.push_back(block);
    }

    /// Parse a single physical line.
    fn parse_line(&mut self) {
        let line = self.cursor.consume_line();

        if self.fence_state.is_some() {
            self.parse_fence_line(line);
            return;
        }
        if self.picture_state.is_some() {
            self.parse_picture_line(line);
            return;
        }

        let line = strip_anchor(self.input, line);
        let indent = line
            .slice(self.input)
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .count();
        let content = Range::from_usize(line.start_usize() + indent, line.end_usize());

        if content.is_empty() {
            self.close_open();
            self.emit(Block::Blank);
            return;
        }

        if self.try_code_fence(content) {
            return;
        }
        if indent < 4 && self.try_heading(content) {
            return;
        }
        if self.try_picture(content) {
            return;
        }
        if self.try_table_row(content) {
            return;
        }
        if self.try_block_quote(content) {
            return;
        }
        if self.try_list_item(indent, content) {
            return;
        }

        self.parse_prose_line(indent, content);
    }

    /// Try to open a code fence (three backticks or `|[`).
    fn try_code_fence(&mut self, content: Range) -> bool {
        let text = content.slice(self.input);
        let base = content.start_usize();

        if let Some(info) = text.strip_prefix("```") {
            let word_start = info.len() - info.trim_start().len();
            let word_len = info[word_start..]
                .find(|c: char| c.is_whitespace() || c == '`')
                .unwrap_or(info.len() - word_start);
            let language = (word_len > 0).then(|| {
                let start = base + 3 + word_start;
                Range::from_usize(start, start + word_len)
            });

            self.close_open();
            self.fence_state = Some(FenceState {
                fence: FenceKind::Backticks,
                language,
                lines: Vec::new(),
            });
            return true;
        }

        if !text.starts_with("|[") {
            return false;
        }

        let mut cursor = Cursor::new_at(self.input, base + 2);
        let line_end = content.end_usize();
        cursor.skip_whitespace();

        let mut language = None;
        if cursor.at_bytes(b"<!--") {
            let comment_start = cursor.offset();
            let comment_end = memchr::memmem::find(&self.input.as_bytes()[comment_start..line_end], b"-->")
                .map(|pos| comment_start + pos);
            if let Some(comment_end) = comment_end {
                let comment = Range::from_usize(comment_start, comment_end);
                language = attribute_value(self.input, comment, "language");
                cursor = Cursor::new_at(self.input, comment_end + 3);
                cursor.skip_whitespace();
            }
        }

        self.close_open();

        // Code may start on the opener line, and may even end there
        let rest = Range::from_usize(cursor.offset().min(line_end), line_end);
        let rest_text = rest.slice(self.input);
        if let Some(close) = rest_text.find("]|") {
            let mut lines = Vec::new();
            let code = rest_text[..close].trim_end();
            if !code.is_empty() {
                lines.push(Range::from_usize(rest.start_usize(), rest.start_usize() + code.len()));
            }
            self.emit(Block::CodeFence {
                fence: FenceKind::Pipe,
                language,
                lines,
            });
            return true;
        }

        let mut lines = Vec::new();
        if !rest.is_empty() {
            lines.push(rest);
        }
        self.fence_state = Some(FenceState {
            fence: FenceKind::Pipe,
            language,
            lines,
        });
        true
    }

    /// Parse a line inside a code fence.
    fn parse_fence_line(&mut self, line: Range) {
        let Some(state) = self.fence_state.as_mut() else {
            return;
        };
        let trimmed = line.slice(self.input).trim_start();
        let closes = match state.fence {
            FenceKind::Backticks => trimmed
                .strip_prefix("```")
                .is_some_and(|rest| rest.trim().is_empty()),
            FenceKind::Pipe => trimmed.starts_with("]|"),
        };

        if !closes {
            state.lines.push(line);
            return;
        }

        if let Some(state) = self.fence_state.take() {
            self.emit(Block::CodeFence {
                fence: state.fence,
                language: state.language,
                lines: state.lines,
            });
        }
    }

    /// Try to parse a `#`-style heading.
    fn try_heading(&mut self, content: Range) -> bool {
        let text = content.slice(self.input);
        let level = text.bytes().take_while(|&b| b == b'#').count();
        if level == 0 || level > limits::MAX_HEADING_LEVEL {
            return false;
        }

        // The space is what separates a heading from `#Type` shorthand
        match text.as_bytes().get(level) {
            Some(b' ') | Some(b'\t') => {}
            _ => return false,
        }

        let mut cursor = Cursor::new_at(self.input, content.start_usize() + level);
        cursor.skip_whitespace();
        let text_start = cursor.offset().min(content.end_usize());
        let text_end = self.trim_heading_end(text_start, content.end_usize());

        self.close_open();
        self.emit(Block::Heading {
            level: level as u8,
            text: Range::from_usize(text_start, text_end),
        });
        true
    }

    /// Trim trailing `#` characters and spaces from heading content.
    fn trim_heading_end(&self, start: usize, end: usize) -> usize {
        let bytes = self.input.as_bytes();
        let mut pos = end;

        while pos > start && (bytes[pos - 1] == b' ' || bytes[pos - 1] == b'\t') {
            pos -= 1;
        }

        let after_hashes = pos;
        while pos > start && bytes[pos - 1] == b'#' {
            pos -= 1;
        }

        // Closing hashes must be preceded by space (or be the whole text)
        if pos < after_hashes {
            if pos == start || bytes[pos - 1] == b' ' || bytes[pos - 1] == b'\t' {
                while pos > start && (bytes[pos - 1] == b' ' || bytes[pos - 1] == b'\t') {
                    pos -= 1;
                }
            } else {
                pos = after_hashes;
            }
        }

        pos
    }

    /// Try to open a `<picture>` element.
    fn try_picture(&mut self, content: Range) -> bool {
        if !content.slice(self.input).starts_with("<picture>") {
            return false;
        }
        self.close_open();
        self.picture_state = Some(PictureState::default());
        self.parse_picture_line(content);
        true
    }

    /// Parse a line inside a `<picture>` element. Only the first `<img>` counts.
    fn parse_picture_line(&mut self, line: Range) {
        let Some(state) = self.picture_state.as_mut() else {
            return;
        };
        let text = line.slice(self.input);

        if state.src.is_none() {
            if let Some(img) = text.find("<img") {
                let tag = Range::from_usize(line.start_usize() + img, line.end_usize());
                state.src = attribute_value(self.input, tag, "src");
                state.alt = attribute_value(self.input, tag, "alt");
            }
        }

        if text.contains("</picture>") {
            if let Some(state) = self.picture_state.take() {
                self.emit(Block::Picture {
                    src: state.src,
                    alt: state.alt,
                });
            }
        }
    }

    /// Try to parse a pipe-framed table row.
    fn try_table_row(&mut self, content: Range) -> bool {
        let text = content.slice(self.input).trim_end();
        if text.len() < 2 || !text.starts_with('|') || !text.ends_with('|') {
            return false;
        }

        let bytes = self.input.as_bytes();
        let inner_start = content.start_usize() + 1;
        let inner_end = content.start_usize() + text.len() - 1;

        let mut cells: SmallVec<[Range; 8]> = SmallVec::new();
        let mut cell_start = inner_start;
        let mut in_code = false;
        let mut i = inner_start;
        while i < inner_end {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'`' => in_code = !in_code,
                b'|' if !in_code && cells.len() + 1 < limits::MAX_TABLE_COLUMNS => {
                    cells.push(trim_range(self.input, cell_start, i));
                    cell_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        cells.push(trim_range(self.input, cell_start, inner_end));

        let separator = cells
            .iter()
            .all(|cell| is_separator_cell(cell.slice(self.input)));

        self.close_open();
        self.emit(Block::TableRow { cells, separator });
        true
    }

    /// Try to parse a `>`-prefixed block quote line.
    fn try_block_quote(&mut self, content: Range) -> bool {
        let text = content.slice(self.input);
        if !text.starts_with('>') {
            return false;
        }
        let skip = if text.as_bytes().get(1) == Some(&b' ') { 2 } else { 1 };
        let quoted = Range::from_usize(content.start_usize() + skip, content.end_usize());

        if self.quote_lines.is_none() {
            self.close_open();
        }
        self.quote_lines.get_or_insert_with(Vec::new).push(quoted);
        true
    }

    /// Try to parse a list item marker.
    fn try_list_item(&mut self, indent: usize, content: Range) -> bool {
        let Some((kind, marker_len)) = list_marker(content.slice(self.input)) else {
            return false;
        };

        let mut cursor = Cursor::new_at(self.input, content.start_usize() + marker_len);
        cursor.skip_whitespace();
        let first = Range::from_usize(cursor.offset(), content.end_usize());

        self.close_open();
        let mut lines = SmallVec::new();
        lines.push(first);
        self.list_item = Some(ListItemState {
            indent: indent as u32,
            kind,
            lines,
        });
        true
    }

    /// Parse a prose line: a list item continuation or paragraph text.
    ///
    /// Only lines indented past the item's marker continue it; anything else
    /// ends the list and starts a paragraph.
    fn parse_prose_line(&mut self, indent: usize, content: Range) {
        self.close_quote();
        if let Some(item) = self.list_item.as_mut() {
            if indent > item.indent as usize {
                item.lines.push(content);
                return;
            }
            self.close_list_item();
        }
        self.paragraph_lines.push(content);
    }

    fn close_paragraph(&mut self) {
        if self.paragraph_lines.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.paragraph_lines);
        self.emit(Block::Paragraph { lines });
    }

    fn close_list_item(&mut self) {
        if let Some(item) = self.list_item.take() {
            self.emit(Block::ListItem {
                indent: item.indent,
                kind: item.kind,
                lines: item.lines,
            });
        }
    }

    fn close_quote(&mut self) {
        if let Some(lines) = self.quote_lines.take() {
            self.emit(Block::BlockQuote { lines });
        }
    }

    /// Close every open accumulating block.
    fn close_open(&mut self) {
        self.close_paragraph();
        self.close_list_item();
        self.close_quote();
    }

    /// Flush whatever is still open at end of input.
    fn finish(&mut self) {
        if let Some(state) = self.fence_state.take() {
            trace!("unterminated code fence flushed at end of input");
            self.emit(Block::CodeFence {
                fence: state.fence,
                language: state.language,
                lines: state.lines,
            });
        }
        if let Some(state) = self.picture_state.take() {
            trace!("unterminated picture flushed at end of input");
            self.emit(Block::Picture {
                src: state.src,
                alt: state.alt,
            });
        }
        self.close_open();
    }
}

impl Iterator for BlockParser<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        loop {
            if let Some(block) = self.pending.pop_front() {
                return Some(block);
            }
            if self.finished {
                return None;
            }
            if self.cursor.is_eof() {
                self.finish();
                self.finished = true;
            } else {
                self.parse_line();
            }
        }
    }
}

/// Recognise a list marker, returning its kind and byte length.
fn list_marker(text: &str) -> Option<(ListKind, usize)> {
    let bytes = text.as_bytes();
    let is_gap = |b: Option<&u8>| matches!(b, Some(b' ') | Some(b'\t'));

    match *bytes.first()? {
        marker @ (b'-' | b'*' | b'+') if is_gap(bytes.get(1)) => {
            Some((ListKind::Unordered { marker }, 1))
        }
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            let delimiter = *bytes.get(digits)?;
            if !matches!(delimiter, b'.' | b')') || !is_gap(bytes.get(digits + 1)) {
                return None;
            }
            let number = text[..digits].parse().ok()?;
            Some((ListKind::Ordered { number, delimiter }, digits + 1))
        }
        _ => None,
    }
}

/// Separator cells are runs of two or more hyphens, optionally colon-framed.
fn is_separator_cell(cell: &str) -> bool {
    let dashes = cell.strip_prefix(':').unwrap_or(cell);
    let dashes = dashes.strip_suffix(':').unwrap_or(dashes);
    dashes.len() >= 2 && dashes.bytes().all(|b| b == b'-')
}

fn trim_range(input: &str, start: usize, end: usize) -> Range {
    let text = &input[start..end];
    let lead = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    Range::from_usize(start + lead, start + lead + trimmed.len())
}

/// Find `name="value"` inside `within`, returning the value range.
fn attribute_value(input: &str, within: Range, name: &str) -> Option<Range> {
    let text = within.slice(input);
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(found) = text[from..].find(name) {
        let at = from + found;
        let after = at + name.len();
        let boundary = at == 0 || matches!(bytes[at - 1], b' ' | b'\t' | b'<' | b'-');
        if boundary && text[after..].starts_with("=\"") {
            let value_start = after + 2;
            let value_len = text[value_start..].find('"')?;
            let start = within.start_usize() + value_start;
            return Some(Range::from_usize(start, start + value_len));
        }
        from = after;
    }
    None
}

/// Strip a trailing `# {#anchor-id}` fragment anchor from a line.
///
/// Heading lines also lose a bare `{#anchor-id}` without the `#` lead-in.
fn strip_anchor(input: &str, line: Range) -> Range {
    let bytes = input.as_bytes();
    let start = line.start_usize();
    let mut end = line.end_usize();
    while end > start && (bytes[end - 1] == b' ' || bytes[end - 1] == b'\t') {
        end -= 1;
    }
    if end == start || bytes[end - 1] != b'}' {
        return line;
    }

    let text = &input[start..end];
    let Some(open) = text.rfind("{#") else {
        return line;
    };
    let id = &text[open + 2..text.len() - 1];
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
        return line;
    }

    let mut cut = start + open;
    while cut > start && is_blank(bytes[cut - 1]) {
        cut -= 1;
    }
    let hashes_end = cut;
    while cut > start && bytes[cut - 1] == b'#' {
        cut -= 1;
    }

    let lead_in = cut < hashes_end && hashes_end < start + open;
    if !lead_in {
        if !is_heading_line(text) {
            return line;
        }
        cut = hashes_end;
    }
    while cut > start && is_blank(bytes[cut - 1]) {
        cut -= 1;
    }
    Range::from_usize(start, cut)
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Whether `text` opens with a `#`-style heading marker.
fn is_heading_line(text: &str) -> bool {
    let text = text.trim_start();
    let level = text.bytes().take_while(|&b| b == b'#').count();
    (1..=limits::MAX_HEADING_LEVEL).contains(&level)
        && text.as_bytes().get(level).is_some_and(|&b| is_blank(b))
}
