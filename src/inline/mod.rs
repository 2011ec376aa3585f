//! Inline scanner for gtk-doc prose.
//!
//! A single left-to-right pass. At each position the constructs that can
//! start with the current byte are tried in priority order; the first match
//! becomes an [`Element`] and scanning resumes after it, so no construct is
//! ever re-scanned inside another one's output:
//! 1. Backtick code spans and `:role:` passthrough
//! 2. `[kind@Target]` cross-references, then `[text](url)` links and images
//! 3. `<kbd>`, `<note>`, `<literal>` tags
//! 4. `%CONSTANT`, `#Type`, `@param`
//! 5. `**strong**` and `_italic_`
//! 6. Identifiers: autolinks, `symbol()` calls, `name_` abbreviations

mod code_span;
mod emphasis;
mod links;
mod refs;
mod tags;

pub use links::join_image_url;

use crate::escape::decode_entities;
use crate::limits;
use crate::resolve::SymbolResolver;
use crate::tree::Element;

/// Ambient state for one translation call.
#[derive(Clone, Copy)]
pub struct InlineContext<'a> {
    /// Registry queried for `%CONST`, `#Type` and `symbol()`.
    pub resolver: &'a dyn SymbolResolver,
    /// Namespace prefixed to unqualified cross-references.
    pub namespace: Option<&'a str>,
    /// Base URL for relative image paths.
    pub image_base_url: &'a str,
}

impl std::fmt::Debug for InlineContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineContext")
            .field("namespace", &self.namespace)
            .field("image_base_url", &self.image_base_url)
            .finish_non_exhaustive()
    }
}

/// Inline parser state.
#[derive(Debug, Clone, Copy)]
pub struct InlineParser<'a> {
    ctx: InlineContext<'a>,
    depth: usize,
}

/// Output being assembled by one [`InlineParser::parse`] call.
struct Scan<'t> {
    text: &'t str,
    /// Start of the pending plain-text run.
    text_start: usize,
    out: Vec<Element>,
}

impl Scan<'_> {
    /// Emit the plain text between `text_start` and `end`.
    fn flush(&mut self, end: usize) {
        if self.text_start >= end {
            return;
        }
        let decoded = decode_entities(&self.text[self.text_start..end]);
        match self.out.last_mut() {
            Some(Element::Text(previous)) => previous.push_str(&decoded),
            _ => self.out.push(Element::Text(decoded.into_owned())),
        }
        self.text_start = end;
    }
}

impl<'a> InlineParser<'a> {
    /// Create a new inline parser.
    pub fn new(ctx: InlineContext<'a>) -> Self {
        Self { ctx, depth: 0 }
    }

    /// The translation context.
    pub fn context(&self) -> &InlineContext<'a> {
        &self.ctx
    }

    /// Parse inline content into elements.
    pub fn parse(&self, text: &str) -> Vec<Element> {
        if text.is_empty() {
            return Vec::new();
        }
        if self.depth >= limits::MAX_INLINE_NESTING {
            return vec![Element::Text(decode_entities(text).into_owned())];
        }

        let bytes = text.as_bytes();
        let mut scan = Scan {
            text,
            text_start: 0,
            out: Vec::new(),
        };
        let mut pos = 0;

        while pos < bytes.len() {
            let matched = match bytes[pos] {
                b'`' => code_span::scan_code_span(text, pos),
                b':' => code_span::scan_role(text, pos),
                b'[' => refs::scan_cross_ref(self, text, pos)
                    .or_else(|| links::scan_link(self, text, pos)),
                b'!' => links::scan_image(self, text, pos),
                b'<' => tags::scan_tag(self, text, pos),
                b'%' => refs::scan_constant(self, text, pos),
                b'#' => refs::scan_type(self, text, pos),
                b'@' => refs::scan_parameter(text, pos),
                b'*' => emphasis::scan_strong(self, text, pos),
                b'_' => emphasis::scan_italic(self, text, pos)
                    .or_else(|| refs::scan_word(self, text, pos)),
                b if is_ident_byte(b) => refs::scan_word(self, text, pos),
                _ => None,
            };

            match matched {
                Some((element, end)) => {
                    scan.flush(pos);
                    scan.out.push(element);
                    scan.text_start = end;
                    pos = end;
                }
                None => pos = skip(text, pos),
            }
        }

        scan.flush(bytes.len());
        scan.out
    }

    /// Parse the content of a nested construct (link label, emphasis, ...).
    fn parse_nested(&self, text: &str) -> Vec<Element> {
        let nested = Self {
            ctx: self.ctx,
            depth: self.depth + 1,
        };
        nested.parse(text)
    }
}

/// Position to resume at when nothing matched at `pos`.
///
/// Identifiers and backtick runs are skipped whole so that no construct
/// starts in the middle of one.
fn skip(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    match bytes[pos] {
        b'`' => pos + run_length(bytes, pos, b'`'),
        b if is_ident_byte(b) => ident_end(bytes, pos),
        b if b < 0x80 => pos + 1,
        _ => pos + text[pos..].chars().next().map_or(1, char::len_utf8),
    }
}

/// Identifier bytes: ASCII letters, digits and `_`.
#[inline]
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Word bytes for boundary checks; non-ASCII counts as a word byte.
#[inline]
fn is_word_byte(b: u8) -> bool {
    is_ident_byte(b) || b >= 0x80
}

/// Whether the byte before `pos` is part of a word.
#[inline]
fn prev_is_word(bytes: &[u8], pos: usize) -> bool {
    pos > 0 && is_word_byte(bytes[pos - 1])
}

/// End of the identifier starting at `pos`.
#[inline]
fn ident_end(bytes: &[u8], pos: usize) -> usize {
    let mut end = pos;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    end
}

/// Length of the run of `b` starting at `pos`.
#[inline]
fn run_length(bytes: &[u8], pos: usize, b: u8) -> usize {
    bytes[pos..].iter().take_while(|&&c| c == b).count()
}

/// Furthest char boundary an inline construct opening at `pos` may reach.
#[inline]
fn span_cap(text: &str, pos: usize) -> usize {
    let mut cap = pos.saturating_add(limits::MAX_INLINE_SPAN).min(text.len());
    while !text.is_char_boundary(cap) {
        cap -= 1;
    }
    cap
}

/// Where the scan for a construct opening at `pos` stops: the end of its
/// line, or [`span_cap`] if that comes first. Inline constructs never cross
/// a newline.
#[inline]
fn line_end(text: &str, pos: usize) -> usize {
    let cap = span_cap(text, pos);
    memchr::memchr(b'\n', &text.as_bytes()[pos..cap]).map_or(cap, |off| pos + off)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Unresolved;
    use crate::tree::{RefKind, Role, Target};

    struct Fixture;

    impl SymbolResolver for Fixture {
        fn resolve_type(&self, name: &str) -> Option<String> {
            (name == "GtkWidget").then(|| "Gtk.Widget".to_string())
        }

        fn resolve_symbol(&self, name: &str) -> Option<String> {
            (name == "gtk_widget_show").then(|| "Gtk.Widget.show".to_string())
        }

        fn resolve_constant(&self, name: &str) -> Option<String> {
            (name == "GTK_ALIGN_START").then(|| "Gtk.Align.START".to_string())
        }

        fn namespace(&self) -> Option<(&str, &str)> {
            Some(("Gtk", "4.0"))
        }
    }

    fn parse_with(resolver: &dyn SymbolResolver, text: &str) -> Vec<Element> {
        let parser = InlineParser::new(InlineContext {
            resolver,
            namespace: resolver.namespace().map(|(name, _)| name),
            image_base_url: "https://docs.example.org/images",
        });
        parser.parse(text)
    }

    fn parse_inline(text: &str) -> Vec<Element> {
        parse_with(&Fixture, text)
    }

    fn text(s: &str) -> Element {
        Element::Text(s.to_string())
    }

    fn code(s: &str) -> Element {
        Element::InlineCode(s.to_string())
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_inline("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn test_empty() {
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            parse_inline("hello `code` world"),
            vec![text("hello "), code("code"), text(" world")]
        );
    }

    #[test]
    fn test_double_backtick_span_kept() {
        assert_eq!(parse_inline("``x``"), vec![code("x")]);
    }

    #[test]
    fn test_unmatched_backtick_is_text() {
        assert_eq!(parse_inline("a ` b"), vec![text("a ` b")]);
    }

    #[test]
    fn test_code_span_does_not_rescan() {
        assert_eq!(parse_inline("`%TRUE @x`"), vec![code("%TRUE @x")]);
    }

    #[test]
    fn test_role_passthrough() {
        assert_eq!(
            parse_inline("see :func:`foo` now"),
            vec![
                text("see "),
                Element::Literal(":func:`foo`".to_string()),
                text(" now")
            ]
        );
    }

    #[test]
    fn test_parameter() {
        assert_eq!(
            parse_inline("the @widget arg"),
            vec![
                text("the "),
                Element::ParameterRef("widget".to_string()),
                text(" arg")
            ]
        );
    }

    #[test]
    fn test_email_is_not_parameter() {
        assert_eq!(parse_inline("me@example.org"), vec![text("me@example.org")]);
    }

    #[test]
    fn test_builtin_constant() {
        assert_eq!(
            parse_inline("%TRUE"),
            vec![Element::ConstantRef {
                name: "TRUE".to_string(),
                target: Some(Target::Builtin {
                    qualifier: "",
                    role: Role::Const,
                    name: "True"
                }),
            }]
        );
    }

    #[test]
    fn test_resolved_and_unresolved_constant() {
        let elements = parse_inline("%GTK_ALIGN_START or %UNKNOWN");
        assert_eq!(
            elements[0],
            Element::ConstantRef {
                name: "GTK_ALIGN_START".to_string(),
                target: Some(Target::Api {
                    role: Role::Const,
                    path: "Gtk.Align.START".to_string()
                }),
            }
        );
        assert_eq!(
            elements[2],
            Element::ConstantRef {
                name: "UNKNOWN".to_string(),
                target: None,
            }
        );
    }

    #[test]
    fn test_type_shorthand() {
        let elements = parse_inline("a #GtkWidget, a #gint and a #GtkFoo");
        assert_eq!(
            elements[1],
            Element::CTypeRef {
                name: "GtkWidget".to_string(),
                target: Some(Target::Api {
                    role: Role::Obj,
                    path: "Gtk.Widget".to_string()
                }),
            }
        );
        assert_eq!(
            elements[3],
            Element::CTypeRef {
                name: "gint".to_string(),
                target: Some(Target::Builtin {
                    qualifier: "",
                    role: Role::Obj,
                    name: "int"
                }),
            }
        );
        assert_eq!(
            elements[5],
            Element::CTypeRef {
                name: "GtkFoo".to_string(),
                target: None,
            }
        );
    }

    #[test]
    fn test_hash_inside_word_is_text() {
        assert_eq!(parse_inline("C#Sharp issue #1"), vec![text("C#Sharp issue #1")]);
    }

    #[test]
    fn test_cross_ref_qualified_with_namespace() {
        assert_eq!(
            parse_inline("[class@Widget]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Class,
                target: Target::Api {
                    role: Role::Obj,
                    path: "Gtk.Widget".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_cross_ref_already_qualified() {
        assert_eq!(
            parse_inline("[method@Gdk.Surface.beep]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Method,
                target: Target::Api {
                    role: Role::Obj,
                    path: "Gdk.Surface.beep".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_cross_ref_property_and_signal() {
        assert_eq!(
            parse_inline("[property@Widget:can-focus]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Property,
                target: Target::Api {
                    role: Role::Attr,
                    path: "Gtk.Widget.props.can_focus".to_string()
                },
            }]
        );
        assert_eq!(
            parse_inline("[signal@Gtk.Widget::state-flags-changed]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Signal,
                target: Target::Api {
                    role: Role::Obj,
                    path: "Gtk.Widget.signals.state_flags_changed".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_cross_ref_alias_is_code() {
        assert_eq!(
            parse_inline("[`callback@Gtk.TickCallback`]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Callback,
                target: Target::Code("Gtk.TickCallback".to_string()),
            }]
        );
    }

    #[test]
    fn test_cross_ref_id_resolves_symbol() {
        assert_eq!(
            parse_inline("[id@gtk_widget_show]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Id,
                target: Target::Api {
                    role: Role::Func,
                    path: "Gtk.Widget.show".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_cross_ref_without_namespace() {
        assert_eq!(
            parse_with(&Unresolved, "[class@Widget]"),
            vec![Element::DocCrossRef {
                kind: RefKind::Class,
                target: Target::Api {
                    role: Role::Obj,
                    path: "Widget".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_unknown_cross_ref_kind_is_text() {
        assert_eq!(parse_inline("[foo@bar]"), vec![text("[foo@bar]")]);
    }

    #[test]
    fn test_symbol_call() {
        assert_eq!(
            parse_inline("call gtk_widget_show() first"),
            vec![
                text("call "),
                Element::CSymbolRef {
                    name: "gtk_widget_show()".to_string(),
                    target: Some("Gtk.Widget.show".to_string()),
                },
                text(" first")
            ]
        );
        assert_eq!(
            parse_inline("some_unknown_func()"),
            vec![Element::CSymbolRef {
                name: "some_unknown_func()".to_string(),
                target: None,
            }]
        );
    }

    #[test]
    fn test_code_abbreviation() {
        assert_eq!(
            parse_inline("the gtk_widget_ family"),
            vec![text("the "), code("gtk_widget_"), text(" family")]
        );
        // No embedded underscore: not an abbreviation
        assert_eq!(parse_inline("a foo_ b"), vec![text("a foo_ b")]);
    }

    #[test]
    fn test_italic() {
        assert_eq!(
            parse_inline("This is a func_name and _italic text_."),
            vec![
                text("This is a func_name and "),
                Element::Emphasis(vec![text("italic text")]),
                text(".")
            ]
        );
    }

    #[test]
    fn test_strong() {
        assert_eq!(
            parse_inline("**bold** move"),
            vec![Element::Strong(vec![text("bold")]), text(" move")]
        );
    }

    #[test]
    fn test_link_with_code_label() {
        assert_eq!(
            parse_inline("[the `x` docs](https://example.org)"),
            vec![Element::Link {
                href: "https://example.org".to_string(),
                children: vec![text("the "), code("x"), text(" docs")],
            }]
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            parse_inline("![A button](button.png)"),
            vec![Element::Image {
                src: "https://docs.example.org/images/button.png".to_string(),
                alt: Some("A button".to_string()),
            }]
        );
    }

    #[test]
    fn test_autolink() {
        assert_eq!(
            parse_inline("see https://gtk.org/docs."),
            vec![
                text("see "),
                Element::Link {
                    href: "https://gtk.org/docs".to_string(),
                    children: Vec::new(),
                },
                text(".")
            ]
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(
            parse_inline("press <kbd>Ctrl</kbd>"),
            vec![text("press "), Element::KeyboardKey("Ctrl".to_string())]
        );
        assert_eq!(
            parse_inline("<literal>NULL</literal>"),
            vec![code("NULL")]
        );
        assert_eq!(
            parse_inline("<note>see @x</note>"),
            vec![Element::Span(vec![
                text("see "),
                Element::ParameterRef("x".to_string())
            ])]
        );
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(parse_inline("a &lt; b &amp; c"), vec![text("a < b & c")]);
    }

    #[test]
    fn test_constructs_do_not_cross_lines() {
        assert_eq!(parse_inline("a `b\nc` d"), vec![text("a `b\nc` d")]);
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(parse_inline("日本語 @x"), vec![text("日本語 "), Element::ParameterRef("x".to_string())]);
    }
}
