//! Emphasis recognition.
//!
//! gtk-doc prose only uses `_italic_` and `**strong**`. A lone `*` is left
//! as text (C pointer declarations are common in prose).

use crate::tree::Element;

use super::{InlineParser, is_word_byte, line_end, prev_is_word};

/// Scan `_italic text_` at `pos`.
///
/// Both underscores must sit on word boundaries, the content must not start
/// or end with whitespace and cannot contain another `_`.
pub(super) fn scan_italic(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    if prev_is_word(bytes, pos) {
        return None;
    }
    let first = *bytes.get(pos + 1)?;
    if first.is_ascii_whitespace() || first == b'_' {
        return None;
    }

    let end = line_end(text, pos);
    let close = pos + 1 + memchr::memchr(b'_', &bytes[pos + 1..end])?;
    if bytes[close - 1].is_ascii_whitespace() {
        return None;
    }
    if bytes.get(close + 1).is_some_and(|&b| is_word_byte(b)) {
        return None;
    }

    let children = parser.parse_nested(&text[pos + 1..close]);
    Some((Element::Emphasis(children), close + 1))
}

/// Scan `**strong text**` at `pos`.
pub(super) fn scan_strong(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    if !text[pos..].starts_with("**") {
        return None;
    }
    let content_start = pos + 2;
    let first = *bytes.get(content_start)?;
    if first.is_ascii_whitespace() || first == b'*' {
        return None;
    }

    let end = line_end(text, pos);
    let close = content_start + memchr::memmem::find(&bytes[content_start..end], b"**")?;
    if bytes[close - 1].is_ascii_whitespace() {
        return None;
    }

    let children = parser.parse_nested(&text[content_start..close]);
    Some((Element::Strong(children), close + 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineContext;
    use crate::resolve::Unresolved;

    fn parser() -> InlineParser<'static> {
        InlineParser::new(InlineContext {
            resolver: &Unresolved,
            namespace: None,
            image_base_url: "",
        })
    }

    fn text(s: &str) -> Element {
        Element::Text(s.to_string())
    }

    #[test]
    fn test_italic() {
        assert_eq!(
            scan_italic(&parser(), "_two words_ x", 0),
            Some((Element::Emphasis(vec![text("two words")]), 11))
        );
    }

    #[test]
    fn test_italic_boundaries() {
        let p = parser();
        assert_eq!(scan_italic(&p, "a_b_", 1), None);
        assert_eq!(scan_italic(&p, "_ spaced_", 0), None);
        assert_eq!(scan_italic(&p, "_spaced _", 0), None);
        assert_eq!(scan_italic(&p, "_x_y", 0), None);
        assert_eq!(scan_italic(&p, "__init__", 0), None);
        assert_eq!(scan_italic(&p, "_open", 0), None);
    }

    #[test]
    fn test_italic_with_code_inside() {
        assert_eq!(
            scan_italic(&parser(), "_see `x`_", 0),
            Some((
                Element::Emphasis(vec![text("see "), Element::InlineCode("x".to_string())]),
                9
            ))
        );
    }

    #[test]
    fn test_strong() {
        assert_eq!(
            scan_strong(&parser(), "**Note:** text", 0),
            Some((Element::Strong(vec![text("Note:")]), 9))
        );
    }

    #[test]
    fn test_strong_rejections() {
        let p = parser();
        assert_eq!(scan_strong(&p, "*x*", 0), None);
        assert_eq!(scan_strong(&p, "** x**", 0), None);
        assert_eq!(scan_strong(&p, "**x **", 0), None);
        assert_eq!(scan_strong(&p, "**x", 0), None);
    }

    #[test]
    fn test_strong_closer_beyond_span_limit() {
        let far = format!("**{}**", "x".repeat(crate::limits::MAX_INLINE_SPAN));
        assert_eq!(scan_strong(&parser(), &far, 0), None);
    }
}
