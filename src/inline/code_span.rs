//! Code span and role recognition.
//!
//! Backtick runs must match exactly. A run of two is already an inline
//! literal in the output syntax and is kept as one, so translating
//! translated text is stable.

use crate::limits;
use crate::tree::Element;

use super::{line_end, run_length};

/// Scan a code span opening at `pos`.
pub(super) fn scan_code_span(text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    let opener_len = run_length(bytes, pos, b'`');
    if opener_len > limits::MAX_CODE_SPAN_BACKTICKS {
        return None;
    }

    let end = line_end(text, pos);
    let mut i = pos + opener_len;
    while let Some(off) = memchr::memchr(b'`', &bytes[i..end]) {
        let closer_pos = i + off;
        let closer_len = run_length(&bytes[..end], closer_pos, b'`');
        if closer_len == opener_len {
            let content = text[pos + opener_len..closer_pos].trim();
            if content.is_empty() {
                return None;
            }
            return Some((
                Element::InlineCode(content.to_string()),
                closer_pos + closer_len,
            ));
        }
        i = closer_pos + closer_len;
    }

    None
}

/// Scan an output-syntax role span such as `` :func:`name` `` at `pos`.
pub(super) fn scan_role(text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    let end = line_end(text, pos);

    let name_start = pos + 1;
    let tick = name_start + memchr::memmem::find(&bytes[name_start..end], b":`")?;
    let name = &bytes[name_start..tick];
    if !name.first()?.is_ascii_alphabetic()
        || !name
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'+'))
    {
        return None;
    }

    let content_start = tick + 2;
    let close = content_start + memchr::memchr(b'`', &bytes[content_start..end])?;
    if close == content_start {
        return None;
    }

    Some((Element::Literal(text[pos..=close].to_string()), close + 1))
}
