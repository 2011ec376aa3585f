//! The few HTML-ish tags gtk-doc prose uses inline.

use crate::escape::decode_entities;
use crate::tree::Element;

use super::{InlineParser, line_end, span_cap};

/// Content between `<tag>` at `pos` and the matching `</tag>`.
///
/// Returns the content range and the position after the closing tag.
fn tag_content(text: &str, pos: usize, open: &str, close: &str, limit: usize) -> Option<(usize, usize, usize)> {
    if !text[pos..].starts_with(open) {
        return None;
    }
    let start = pos + open.len();
    let end = start + memchr::memmem::find(&text.as_bytes()[start..limit], close.as_bytes())?;
    Some((start, end, end + close.len()))
}

/// Scan a tag at `pos`.
pub(super) fn scan_tag(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let line = line_end(text, pos);

    if let Some((start, end, after)) = tag_content(text, pos, "<kbd>", "</kbd>", line) {
        let key = decode_entities(text[start..end].trim());
        if key.is_empty() {
            return None;
        }
        return Some((Element::KeyboardKey(key.into_owned()), after));
    }

    if let Some((start, end, after)) = tag_content(text, pos, "<literal>", "</literal>", line) {
        let literal = decode_entities(text[start..end].trim());
        if literal.is_empty() {
            return None;
        }
        return Some((Element::InlineCode(literal.into_owned()), after));
    }

    // Notes may wrap over several lines of the paragraph
    if let Some((start, end, after)) = tag_content(text, pos, "<note>", "</note>", span_cap(text, pos)) {
        return Some((Element::Span(parser.parse_nested(text[start..end].trim())), after));
    }

    // `<https://...>`
    let rest = &text[pos + 1..line];
    if rest.starts_with("http://") || rest.starts_with("https://") {
        let close = memchr::memchr(b'>', rest.as_bytes())?;
        let url = &rest[..close];
        if url.contains(char::is_whitespace) {
            return None;
        }
        return Some((
            Element::Link {
                href: url.to_string(),
                children: Vec::new(),
            },
            pos + 1 + close + 1,
        ));
    }

    None
}
