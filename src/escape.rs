//! reStructuredText escaping utilities.
//!
//! Fast-path optimized: scans for the first byte that may need escaping,
//! then bulk-copies segments between escapes.

use std::borrow::Cow;

/// Bytes that may need a backslash in running text.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'\\' as usize] = true;
    table[b'*' as usize] = true;
    table[b'|' as usize] = true;
    table[b'`' as usize] = true;
    table[b'_' as usize] = true;
    table
};

/// Bytes that need a backslash inside a hyperlink label.
const LABEL_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'\\' as usize] = true;
    table[b'`' as usize] = true;
    table[b'<' as usize] = true;
    table
};

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[inline]
fn is_space_or_edge(b: Option<u8>) -> bool {
    b.is_none_or(|b| b.is_ascii_whitespace())
}

/// Whether the byte at `pos` would be read as inline markup.
#[inline]
fn needs_escape(input: &[u8], pos: usize) -> bool {
    let prev = pos.checked_sub(1).map(|p| input[p]);
    let next = input.get(pos + 1).copied();
    match input[pos] {
        b'\\' => true,
        // Reference suffix: `word_`
        b'_' => prev.is_some_and(is_word_byte) && !next.is_some_and(is_word_byte),
        // `| ` opening a line starts a line block
        b'|' if prev.is_none_or(|b| b == b'\n') => true,
        // A lone `*`, `|` or backtick between spaces starts nothing
        _ => !(is_space_or_edge(prev) && is_space_or_edge(next)),
    }
}

/// Escape running text into output buffer.
///
/// Backslashes are doubled; `*`, `|` and backticks that could open or close
/// inline markup are backslash-escaped, as is a `|` opening a line; a `word_`
/// reference suffix becomes `word\_`.
///
/// # Example
/// ```
/// use gtkdoc_rst::escape::escape_text_into;
///
/// let mut out = String::new();
/// escape_text_into(&mut out, "a *b* c_ d * e");
/// assert_eq!(out, "a \\*b\\* c\\_ d * e");
/// ```
pub fn escape_text_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if TEXT_ESCAPE_TABLE[bytes[pos] as usize] && needs_escape(bytes, pos) {
            out.push_str(&input[copied..pos]);
            out.push('\\');
            copied = pos;
        }
        pos += 1;
    }

    out.push_str(&input[copied..]);
}

/// Escape text used as a hyperlink label, `` `label <url>`_ ``.
pub fn escape_label_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let Some(first) = bytes.iter().position(|&b| LABEL_ESCAPE_TABLE[b as usize]) else {
        out.push_str(input);
        return;
    };

    out.push_str(&input[..first]);
    let mut copied = first;
    for (pos, &b) in bytes.iter().enumerate().skip(first) {
        if LABEL_ESCAPE_TABLE[b as usize] {
            out.push_str(&input[copied..pos]);
            out.push('\\');
            copied = pos;
        }
    }
    out.push_str(&input[copied..]);
}

/// Decode HTML character references (`&lt;`, `&#42;`, ...).
#[inline]
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    html_escape::decode_html_entities(input)
}
