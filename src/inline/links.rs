//! Link and image parsing.
//!
//! Handles:
//! - Inline links: `[text](url "title")`
//! - Images: `![alt](path)`, relative paths joined onto the image base URL
//! - Bare autolinks: `https://example.com`

use crate::escape::decode_entities;
use crate::tree::Element;

use super::{InlineParser, line_end};

/// A bracketed label followed by a parenthesized destination.
struct BracketLink<'t> {
    label: &'t str,
    url: &'t str,
    /// Position after the closing `)`.
    end: usize,
}

/// Parse `[label](url)` with the `[` at `open`.
fn parse_bracket_link(text: &str, open: usize) -> Option<BracketLink<'_>> {
    let bytes = text.as_bytes();
    let end = line_end(text, open);

    // Matching `]`, allowing balanced nested brackets in the label
    let mut depth = 0usize;
    let mut i = open;
    let close = loop {
        if i >= end {
            return None;
        }
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    break i;
                }
            }
            _ => {}
        }
        i += 1;
    };

    if bytes.get(close + 1) != Some(&b'(') {
        return None;
    }

    let dest_start = close + 2;
    let mut parens = 0usize;
    let mut j = dest_start;
    let dest_end = loop {
        if j >= end {
            return None;
        }
        match bytes[j] {
            b'(' => parens += 1,
            b')' if parens == 0 => break j,
            b')' => parens -= 1,
            _ => {}
        }
        j += 1;
    };

    // Optional title after the destination is dropped
    let destination = text[dest_start..dest_end].trim();
    let url = destination.split_whitespace().next()?;
    let url = url
        .strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url);
    if url.is_empty() {
        return None;
    }

    Some(BracketLink {
        label: &text[open + 1..close],
        url,
        end: dest_end + 1,
    })
}

/// Scan `[text](url)` at `pos`.
pub(super) fn scan_link(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let link = parse_bracket_link(text, pos)?;
    let children = if link.label.trim().is_empty() {
        Vec::new()
    } else {
        parser.parse_nested(link.label)
    };
    Some((
        Element::Link {
            href: decode_entities(link.url).into_owned(),
            children,
        },
        link.end,
    ))
}

/// Scan `![alt](path)` at `pos`.
pub(super) fn scan_image(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    if text.as_bytes().get(pos + 1) != Some(&b'[') {
        return None;
    }
    let link = parse_bracket_link(text, pos + 1)?;
    let alt = link.label.trim();
    Some((
        Element::Image {
            src: join_image_url(parser.context().image_base_url, link.url),
            alt: (!alt.is_empty()).then(|| decode_entities(alt).into_owned()),
        },
        link.end,
    ))
}

/// Scan a bare `http://` or `https://` URL at `pos`.
pub(super) fn scan_autolink(text: &str, pos: usize) -> Option<(Element, usize)> {
    let rest = &text[pos..];
    let scheme_len = if rest.starts_with("https://") {
        8
    } else if rest.starts_with("http://") {
        7
    } else {
        return None;
    };

    let bytes = rest.as_bytes();
    let mut end = bytes
        .iter()
        .position(|&b| b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b'"' | b'`'))
        .unwrap_or(bytes.len());

    // Trailing punctuation belongs to the sentence, unbalanced `)` to the prose
    let open = bytes[..end].iter().filter(|&&b| b == b'(').count();
    let mut close = bytes[..end].iter().filter(|&&b| b == b')').count();
    loop {
        match bytes[end - 1] {
            b'.' | b',' | b';' | b':' | b'!' | b'?' | b'\'' => end -= 1,
            b')' if close > open => {
                close -= 1;
                end -= 1;
            }
            _ => break,
        }
        if end <= scheme_len {
            return None;
        }
    }
    if end <= scheme_len {
        return None;
    }

    Some((
        Element::Link {
            href: rest[..end].to_string(),
            children: Vec::new(),
        },
        pos + end,
    ))
}

/// Join a relative image path onto `base`.
///
/// An empty base, an absolute URL and a path already under `base` are
/// returned unchanged; otherwise exactly one `/` separates the two.
pub fn join_image_url(base: &str, path: &str) -> String {
    if base.is_empty() || path.contains("://") || path.starts_with(base) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
