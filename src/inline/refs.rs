//! gtk-doc reference sigils.
//!
//! - `[kind@Target]` documentation links
//! - `%CONSTANT`, `#Type`, `@parameter`
//! - `symbol()` calls and `name_` code abbreviations

use tracing::debug;

use crate::limits;
use crate::resolve::{builtin_constant, builtin_type};
use crate::tree::{Element, RefKind, Role, Target};

use super::{InlineContext, InlineParser, ident_end, is_word_byte, line_end, links, prev_is_word};

/// Qualify `name` with the ambient namespace unless it is already dotted.
fn qualify(ctx: &InlineContext<'_>, name: &str) -> String {
    match ctx.namespace {
        Some(namespace) if !name.contains('.') => format!("{namespace}.{name}"),
        _ => name.to_string(),
    }
}

/// Map a documentation link onto its output target.
fn cross_ref_target(ctx: &InlineContext<'_>, kind: RefKind, raw: &str) -> Target {
    let object = |path: String| Target::Api {
        role: Role::Obj,
        path,
    };

    match kind {
        RefKind::Alias | RefKind::Callback => Target::Code(raw.to_string()),
        RefKind::Property => match raw.split_once(':') {
            Some((owner, property)) => Target::Api {
                role: Role::Attr,
                path: format!("{}.props.{}", qualify(ctx, owner), property.replace('-', "_")),
            },
            None => object(qualify(ctx, raw)),
        },
        RefKind::Signal => match raw.split_once("::") {
            Some((owner, signal)) => object(format!(
                "{}.signals.{}",
                qualify(ctx, owner),
                signal.replace('-', "_")
            )),
            None => object(qualify(ctx, raw)),
        },
        RefKind::Id => match ctx.resolver.resolve_symbol(raw) {
            Some(path) => Target::Api {
                role: Role::Func,
                path,
            },
            None => object(qualify(ctx, raw)),
        },
        RefKind::Ctor
        | RefKind::Class
        | RefKind::Const
        | RefKind::Enum
        | RefKind::Error
        | RefKind::Flags
        | RefKind::Func
        | RefKind::Iface
        | RefKind::Method
        | RefKind::Struct
        | RefKind::Type
        | RefKind::Vfunc => object(qualify(ctx, raw)),
    }
}

/// Scan `[kind@Target]` at `pos`. The target may be wrapped in backticks.
pub(super) fn scan_cross_ref(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    let end = line_end(text, pos);

    let mut i = pos + 1;
    while i < end && bytes[i] == b'`' {
        i += 1;
    }
    let tag_start = i;
    while i < end && bytes[i].is_ascii_lowercase() {
        i += 1;
    }
    if i >= end || bytes[i] != b'@' {
        return None;
    }
    let kind = RefKind::from_tag(&text[tag_start..i])?;

    let target_start = i + 1;
    let close = target_start + memchr::memchr(b']', &bytes[target_start..end])?;
    let raw = text[target_start..close].trim_matches('`');
    if raw.is_empty() || raw.contains(char::is_whitespace) {
        return None;
    }

    let target = cross_ref_target(parser.context(), kind, raw);
    Some((Element::DocCrossRef { kind, target }, close + 1))
}

/// Scan `%CONSTANT` at `pos`.
pub(super) fn scan_constant(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let end = ident_end(text.as_bytes(), pos + 1);
    if end == pos + 1 || end - pos > limits::MAX_IDENTIFIER_LEN {
        return None;
    }
    let name = &text[pos + 1..end];

    let target = builtin_constant(name).or_else(|| {
        parser
            .context()
            .resolver
            .resolve_constant(name)
            .map(|path| Target::Api {
                role: Role::Const,
                path,
            })
    });
    if target.is_none() {
        debug!(constant = name, "unresolved constant");
    }

    Some((
        Element::ConstantRef {
            name: name.to_string(),
            target,
        },
        end,
    ))
}

/// Scan `#Type` at `pos`. `#` inside a word or before a digit is prose.
pub(super) fn scan_type(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    if prev_is_word(bytes, pos) {
        return None;
    }
    let start = pos + 1;
    if !bytes.get(start).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') {
        return None;
    }
    let end = ident_end(bytes, start);
    if end - start > limits::MAX_IDENTIFIER_LEN {
        return None;
    }
    let name = &text[start..end];

    if let Some((member, member_end)) = type_member(bytes, end) {
        let target = parser.context().resolver.resolve_type(name).map(|owner| {
            let property = text[member.clone()].replace('-', "_");
            match member.start - end {
                1 => Target::Api {
                    role: Role::Attr,
                    path: format!("{owner}.props.{property}"),
                },
                _ => Target::Api {
                    role: Role::Obj,
                    path: format!("{owner}.signals.{property}"),
                },
            }
        });
        if target.is_none() {
            debug!(c_type = name, "unresolved type");
        }
        return Some((
            Element::CTypeRef {
                name: text[start..member_end].to_string(),
                target,
            },
            member_end,
        ));
    }

    let target = match builtin_type(name) {
        Some(builtin) => Some(Target::Builtin {
            qualifier: "",
            role: Role::Obj,
            name: builtin,
        }),
        None => parser
            .context()
            .resolver
            .resolve_type(name)
            .map(|path| Target::Api {
                role: Role::Obj,
                path,
            }),
    };
    if target.is_none() {
        debug!(c_type = name, "unresolved type");
    }

    Some((
        Element::CTypeRef {
            name: name.to_string(),
            target,
        },
        end,
    ))
}

/// A `:property` or `::signal` suffix after a type name ending at `end`.
///
/// Returns the member name range and the position after it.
fn type_member(bytes: &[u8], end: usize) -> Option<(std::ops::Range<usize>, usize)> {
    let colons = bytes[end..].iter().take(2).take_while(|&&b| b == b':').count();
    if colons == 0 {
        return None;
    }
    let start = end + colons;
    if !bytes.get(start).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    let mut member_end = start;
    while member_end < bytes.len()
        && member_end - start < limits::MAX_IDENTIFIER_LEN
        && (bytes[member_end].is_ascii_alphanumeric() || matches!(bytes[member_end], b'-' | b'_'))
    {
        member_end += 1;
    }
    // Trailing hyphens are punctuation
    while bytes[member_end - 1] == b'-' {
        member_end -= 1;
    }
    Some((start..member_end, member_end))
}

/// Scan `@parameter` at `pos`.
pub(super) fn scan_parameter(text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    // `user@host` is prose
    if pos > 0 && bytes[pos - 1].is_ascii_alphanumeric() {
        return None;
    }
    let start = pos + 1;
    if !bytes.get(start).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') {
        return None;
    }
    let end = ident_end(bytes, start);
    if end - start > limits::MAX_IDENTIFIER_LEN {
        return None;
    }
    Some((Element::ParameterRef(text[start..end].to_string()), end))
}

/// Scan an identifier starting a word at `pos`: autolinks, `symbol()` calls
/// and `name_` code abbreviations.
pub(super) fn scan_word(parser: &InlineParser<'_>, text: &str, pos: usize) -> Option<(Element, usize)> {
    let bytes = text.as_bytes();
    if prev_is_word(bytes, pos) {
        return None;
    }
    let end = ident_end(bytes, pos);
    let word = &text[pos..end];
    let rest = &text[end..];

    if matches!(word, "http" | "https") && rest.starts_with("://") {
        return links::scan_autolink(text, pos);
    }

    if rest.starts_with("()") {
        let target = parser.context().resolver.resolve_symbol(word);
        if target.is_none() {
            debug!(symbol = word, "unresolved symbol");
        }
        return Some((
            Element::CSymbolRef {
                name: format!("{word}()"),
                target,
            },
            end + 2,
        ));
    }

    // `gtk_widget_` style abbreviation: a trailing underscore after an
    // identifier that already has one inside
    let stem = word.trim_end_matches('_');
    if stem.len() < word.len()
        && stem.contains('_')
        && !bytes.get(end).is_some_and(|&b| is_word_byte(b))
    {
        return Some((Element::InlineCode(word.to_string()), end));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Unresolved;

    fn ctx(namespace: Option<&str>) -> InlineContext<'_> {
        InlineContext {
            resolver: &Unresolved,
            namespace,
            image_base_url: "",
        }
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify(&ctx(Some("Gtk")), "Widget"), "Gtk.Widget");
        assert_eq!(qualify(&ctx(Some("Gtk")), "Gdk.Display"), "Gdk.Display");
        assert_eq!(qualify(&ctx(None), "Widget"), "Widget");
    }

    #[test]
    fn test_property_without_member_falls_back() {
        assert_eq!(
            cross_ref_target(&ctx(Some("Gtk")), RefKind::Property, "Widget"),
            Target::Api {
                role: Role::Obj,
                path: "Gtk.Widget".to_string()
            }
        );
    }

    #[test]
    fn test_id_without_symbol_is_qualified() {
        assert_eq!(
            cross_ref_target(&ctx(Some("Gtk")), RefKind::Id, "gtk_init"),
            Target::Api {
                role: Role::Obj,
                path: "Gtk.gtk_init".to_string()
            }
        );
    }

    #[test]
    fn test_type_member_suffix() {
        assert_eq!(type_member(b"W:can-focus.", 1), Some((2..11, 11)));
        assert_eq!(type_member(b"W::notify-", 1), Some((3..9, 9)));
        assert_eq!(type_member(b"W: text", 1), None);
        assert_eq!(type_member(b"W:::x", 1), None);
        assert_eq!(type_member(b"W", 1), None);
    }

    #[test]
    fn test_unresolved_signal_stays_whole() {
        let parser = InlineParser::new(ctx(None));
        assert_eq!(
            scan_type(&parser, "#GtkWidget::destroy is", 0),
            Some((
                Element::CTypeRef {
                    name: "GtkWidget::destroy".to_string(),
                    target: None
                },
                19
            ))
        );
    }

    #[test]
    fn test_parameter_boundaries() {
        assert_eq!(
            scan_parameter("@x_y.", 0),
            Some((Element::ParameterRef("x_y".to_string()), 4))
        );
        assert_eq!(scan_parameter("@ x", 0), None);
        assert_eq!(scan_parameter("a@b", 1), None);
        assert!(scan_parameter("(@b)", 1).is_some());
    }

    #[test]
    fn test_constant_needs_name() {
        let parser = InlineParser::new(ctx(None));
        assert_eq!(scan_constant(&parser, "100% sure", 3), None);
        assert_eq!(
            scan_constant(&parser, "%s", 0),
            Some((
                Element::ConstantRef {
                    name: "s".to_string(),
                    target: None
                },
                2
            ))
        );
    }

    #[test]
    fn test_word_mid_identifier() {
        let parser = InlineParser::new(ctx(None));
        assert_eq!(scan_word(&parser, "foo_bar()", 4), None);
    }

    #[test]
    fn test_abbreviation_with_double_underscore() {
        let parser = InlineParser::new(ctx(None));
        assert_eq!(
            scan_word(&parser, "g_object__ x", 0),
            Some((Element::InlineCode("g_object__".to_string()), 10))
        );
    }
}
