//! reStructuredText writer.
//!
//! Walks the element tree and emits markup. Blocks are separated by exactly
//! one blank line; nested blocks (list items, block quotes) are rendered by a
//! child writer and indented as a whole.

use std::fmt::Write as _;

use crate::Options;
use crate::block::ListKind;
use crate::escape;
use crate::table::{GridRow, write_grid};
use crate::tree::{Element, TableRow, Target, plain_text};

/// Characters allowed right before inline markup without a separator.
const MARKUP_OPENERS: &str = "-:/'\"<([{";

/// Characters allowed right after inline markup without a separator.
const MARKUP_CLOSERS: &str = "-.,:;!?\\/'\")]}>";

/// reStructuredText writer with a reusable buffer.
///
/// # Example
/// ```
/// use gtkdoc_rst::{Options, RstWriter};
/// use gtkdoc_rst::tree::Element;
///
/// let options = Options::default();
/// let mut writer = RstWriter::new(&options);
/// writer.write_blocks(&[Element::Paragraph(vec![
///     Element::Text("call ".to_string()),
///     Element::InlineCode("init".to_string()),
/// ])]);
/// assert_eq!(writer.into_string(), "call ``init``");
/// ```
pub struct RstWriter<'o> {
    out: String,
    options: &'o Options,
    /// The last thing written was inline markup.
    after_markup: bool,
}

impl<'o> RstWriter<'o> {
    /// Create a new writer.
    #[inline]
    pub fn new(options: &'o Options) -> Self {
        Self::with_capacity_for(0, options)
    }

    /// Create with pre-allocated capacity based on expected input size.
    #[inline]
    pub fn with_capacity_for(input_len: usize, options: &'o Options) -> Self {
        Self {
            out: String::with_capacity(input_len + input_len / 4),
            options,
            after_markup: false,
        }
    }

    /// A fresh writer sharing this writer's options.
    fn child(&self) -> Self {
        Self::new(self.options)
    }

    /// Output written so far.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Check if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Finish writing: trailing whitespace is stripped from every line and
    /// from the end of the output.
    pub fn into_string(self) -> String {
        let mut result = String::with_capacity(self.out.len());
        for (i, line) in self.out.trim_end().split('\n').enumerate() {
            if i > 0 {
                result.push('\n');
            }
            result.push_str(line.trim_end());
        }
        result
    }

    /// Start a new block, leaving one blank line after the previous one.
    fn block_start(&mut self) {
        if self.out.is_empty() {
            return;
        }
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        if !self.out.is_empty() {
            self.out.push_str("\n\n");
        }
        self.after_markup = false;
    }

    /// Write `body` with every non-blank line prefixed by `first` (first
    /// line) or `rest` (other lines).
    fn write_indented(&mut self, body: &str, first: &str, rest: &str) {
        for (i, line) in body.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            if line.is_empty() {
                if i == 0 {
                    self.out.push_str(first.trim_end());
                }
                continue;
            }
            self.out.push_str(if i == 0 { first } else { rest });
            self.out.push_str(line);
        }
    }

    /// Write block-level elements.
    ///
    /// Runs of stray inline elements are written as one paragraph.
    pub fn write_blocks(&mut self, elements: &[Element]) {
        let mut rest = elements;
        while let Some(first) = rest.first() {
            if first.is_block() {
                self.write_block(first);
                rest = &rest[1..];
            } else {
                let run = rest.iter().take_while(|e| !e.is_block()).count();
                self.write_paragraph(&rest[..run]);
                rest = &rest[run..];
            }
        }
    }

    fn write_block(&mut self, element: &Element) {
        match element {
            Element::Paragraph(children) => self.write_paragraph(children),
            Element::Heading { children, .. } => self.write_heading(children),
            Element::List { kind, items } => self.write_list(*kind, items),
            Element::ListItem(children) => self.write_blocks(children),
            Element::BlockQuote(children) => {
                let mut inner = self.child();
                inner.write_blocks(children);
                let body = inner.into_string();
                if !body.is_empty() {
                    self.block_start();
                    self.write_indented(&body, "    ", "    ");
                }
            }
            Element::CodeBlock { language, lines } => {
                self.write_code_block(language.as_deref(), lines)
            }
            Element::Table { rows } => self.write_table(rows),
            Element::Text(_)
            | Element::Emphasis(_)
            | Element::Strong(_)
            | Element::InlineCode(_)
            | Element::Link { .. }
            | Element::Image { .. }
            | Element::KeyboardKey(_)
            | Element::Span(_)
            | Element::Literal(_)
            | Element::ParameterRef(_)
            | Element::ConstantRef { .. }
            | Element::CTypeRef { .. }
            | Element::CSymbolRef { .. }
            | Element::DocCrossRef { .. } => self.write_paragraph(std::slice::from_ref(element)),
        }
    }

    /// Write a paragraph; images inside it become directives of their own.
    fn write_paragraph(&mut self, children: &[Element]) {
        for segment in children.split_inclusive(|child| matches!(child, Element::Image { .. })) {
            let (inlines, image) = match segment.split_last() {
                Some((Element::Image { src, alt }, inlines)) => (inlines, Some((src, alt))),
                _ => (segment, None),
            };

            let mut inner = self.child();
            inner.write_inlines(inlines);
            let text = inner.into_string();
            let text = text.trim();
            if !text.is_empty() {
                self.block_start();
                self.out.push_str(text);
            }

            if let Some((src, alt)) = image {
                self.write_image(src, alt.as_deref());
            }
        }
    }

    fn write_image(&mut self, src: &str, alt: Option<&str>) {
        self.block_start();
        let _ = write!(self.out, ".. image:: {src}");
        if let Some(alt) = alt {
            let _ = write!(self.out, "\n   :alt: {}", alt.replace('\n', " "));
        }
    }

    /// Write a heading: the title, then a `-` underline of equal length.
    fn write_heading(&mut self, children: &[Element]) {
        let mut inner = self.child();
        inner.write_inlines(children);
        let title = inner.into_string();
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        self.block_start();
        self.out.push_str(title);
        self.out.push('\n');
        self.out
            .extend(std::iter::repeat_n('-', title.chars().count()));
    }

    fn write_list(&mut self, kind: ListKind, items: &[Element]) {
        let bodies: Vec<String> = items
            .iter()
            .map(|item| {
                let mut inner = self.child();
                inner.write_block(item);
                inner.into_string()
            })
            .collect();
        // Items holding more than one block need blank lines between items
        let loose = bodies.iter().any(|body| body.contains("\n\n"));

        self.block_start();
        for (i, body) in bodies.iter().enumerate() {
            if i > 0 {
                self.out.push_str(if loose { "\n\n" } else { "\n" });
            }
            let marker = match kind {
                ListKind::Unordered { .. } => "- ".to_string(),
                ListKind::Ordered { number, delimiter } => {
                    format!("{}{} ", number as usize + i, delimiter as char)
                }
            };
            let hang = " ".repeat(marker.len());
            self.write_indented(body, &marker, &hang);
        }
    }

    fn write_code_block(&mut self, language: Option<&str>, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.block_start();
        self.out.push_str(".. code-block::");
        if let Some(language) = language {
            self.out.push(' ');
            self.out.push_str(language);
        }
        let indent = " ".repeat(self.options.code_indent);
        let _ = write!(self.out, "\n{indent}:dedent:\n");
        for line in lines {
            self.out.push('\n');
            if !line.is_empty() {
                self.out.push_str(&indent);
                self.out.push_str(line);
            }
        }
    }

    fn write_table(&mut self, rows: &[TableRow]) {
        let grid: Vec<GridRow> = rows
            .iter()
            .map(|row| GridRow {
                cells: row
                    .cells
                    .iter()
                    .map(|cell| {
                        let mut inner = self.child();
                        inner.write_paragraph(cell);
                        inner.into_string()
                    })
                    .collect(),
                header: row.header,
            })
            .collect();

        let mut table = String::new();
        write_grid(&mut table, &grid);
        if !table.is_empty() {
            self.block_start();
            self.out.push_str(&table);
        }
    }

    /// Write inline elements.
    pub fn write_inlines(&mut self, elements: &[Element]) {
        for element in elements {
            self.write_inline(element);
        }
    }

    fn write_inline(&mut self, element: &Element) {
        match element {
            Element::Text(text) => self.write_text(text),
            Element::Emphasis(children) => self.write_wrapped("*", children),
            Element::Strong(children) => self.write_wrapped("**", children),
            Element::InlineCode(code) | Element::ParameterRef(code) => self.write_code(code),
            Element::Link { href, children } => {
                if children.is_empty() {
                    self.markup_start();
                    self.out.push_str(href);
                } else {
                    let label = plain_text(children);
                    self.markup_start();
                    self.out.push('`');
                    escape::escape_label_into(&mut self.out, label.trim());
                    let _ = write!(self.out, " <{href}>`_");
                }
                self.after_markup = true;
            }
            Element::Image { alt, .. } => {
                // Only reachable outside paragraphs (headings, labels)
                if let Some(alt) = alt {
                    self.write_text(alt);
                }
            }
            Element::KeyboardKey(key) => {
                self.markup_start();
                let _ = write!(self.out, ":kbd:`{key}`");
                self.after_markup = true;
            }
            Element::Span(children) => self.write_inlines(children),
            Element::Literal(markup) => {
                self.markup_start();
                self.out.push_str(markup);
                self.after_markup = true;
            }
            Element::ConstantRef { name, target } => match target {
                Some(target) => self.write_target(target),
                None => self.write_code(&format!("%{name}")),
            },
            Element::CTypeRef { name, target } => match target {
                Some(target) => self.write_target(target),
                None => self.write_code(name),
            },
            Element::CSymbolRef { name, target } => match target {
                Some(path) => {
                    self.markup_start();
                    let _ = write!(self.out, ":func:`{name} <{}>`", self.qualified(path));
                    self.after_markup = true;
                }
                None => self.write_text(name),
            },
            Element::DocCrossRef { target, .. } => self.write_target(target),
            Element::Paragraph(children)
            | Element::Heading { children, .. }
            | Element::ListItem(children)
            | Element::BlockQuote(children) => self.write_inlines(children),
            Element::List { items, .. } => self.write_inlines(items),
            Element::CodeBlock { lines, .. } => self.write_code(&lines.join(" ")),
            Element::Table { rows } => {
                for cell in rows.iter().flat_map(|row| row.cells.iter()) {
                    self.write_inlines(cell);
                }
            }
        }
    }

    /// Running text, escaped. Text glued to preceding markup gets a
    /// separator, except a possessive `s` which becomes `'s`.
    fn write_text(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            return;
        };
        if self.after_markup && !(first.is_whitespace() || MARKUP_CLOSERS.contains(first)) {
            let possessive = text.strip_prefix('s').is_some_and(|rest| {
                !rest
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_')
            });
            if possessive {
                self.out.push('\'');
            } else {
                self.out.push_str("\\ ");
            }
        }
        escape::escape_text_into(&mut self.out, text);
        self.after_markup = false;
    }

    /// Emit a separator if the output so far would swallow a markup start.
    fn markup_start(&mut self) {
        if self.after_markup {
            self.out.push_str("\\ ");
            return;
        }
        if let Some(last) = self.out.chars().next_back() {
            if !(last.is_whitespace() || MARKUP_OPENERS.contains(last)) {
                self.out.push_str("\\ ");
            }
        }
    }

    fn write_code(&mut self, code: &str) {
        self.markup_start();
        let _ = write!(self.out, "``{code}``");
        self.after_markup = true;
    }

    fn write_wrapped(&mut self, delimiter: &str, children: &[Element]) {
        let text = plain_text(children);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.markup_start();
        self.out.push_str(delimiter);
        escape::escape_text_into(&mut self.out, text);
        self.out.push_str(delimiter);
        self.after_markup = true;
    }

    fn qualified(&self, path: &str) -> String {
        if self.options.module_prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}.{path}", self.options.module_prefix)
        }
    }

    fn write_target(&mut self, target: &Target) {
        match target {
            Target::Api { role, path } => {
                self.markup_start();
                let _ = write!(self.out, ":{}:`~{}`", role.as_str(), self.qualified(path));
                self.after_markup = true;
            }
            Target::Builtin {
                qualifier,
                role,
                name,
            } => {
                if !qualifier.is_empty() {
                    self.write_text(qualifier);
                }
                self.markup_start();
                let _ = write!(self.out, ":{}:`{name}`", role.as_str());
                self.after_markup = true;
            }
            Target::Code(code) => self.write_code(code),
        }
    }
}

impl std::fmt::Write for RstWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}
