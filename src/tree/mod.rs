//! Intermediate element tree.
//!
//! The inline scanner and the tree builder produce [`Element`]s; the
//! serializer walks them. The tag vocabulary is closed: adding a variant
//! forces every `match` over it to be revisited.

mod builder;

pub use builder::TreeBuilder;

use crate::block::ListKind;

/// Cross-reference role in the output markup (`:obj:`, `:func:`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Any Python object.
    Obj,
    /// A constant value.
    Const,
    /// A callable.
    Func,
    /// An attribute or property.
    Attr,
}

impl Role {
    /// Role name as written between the colons.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Obj => "obj",
            Role::Const => "const",
            Role::Func => "func",
            Role::Attr => "attr",
        }
    }
}

/// What a resolved reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A documented API path, rendered under the module prefix.
    Api {
        /// Output role.
        role: Role,
        /// Dotted path, e.g. `Gtk.Widget.props.visible`.
        path: String,
    },
    /// A Python builtin such as `True` or `int`.
    Builtin {
        /// Plain text written before the role, e.g. `unsigned `.
        qualifier: &'static str,
        /// Output role.
        role: Role,
        /// Builtin name.
        name: &'static str,
    },
    /// No cross-reference, just inline code.
    Code(String),
}

/// Kind tag of a `[kind@Target]` documentation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Ctor,
    Class,
    Const,
    Enum,
    Error,
    Flags,
    Func,
    Id,
    Iface,
    Method,
    Struct,
    Type,
    Vfunc,
    Property,
    Signal,
    Alias,
    Callback,
}

impl RefKind {
    /// Parse the tag written before the `@`.
    pub fn from_tag(tag: &str) -> Option<RefKind> {
        Some(match tag {
            "ctor" => RefKind::Ctor,
            "class" => RefKind::Class,
            "const" => RefKind::Const,
            "enum" => RefKind::Enum,
            "error" => RefKind::Error,
            "flags" => RefKind::Flags,
            "func" => RefKind::Func,
            "id" => RefKind::Id,
            "iface" => RefKind::Iface,
            "method" => RefKind::Method,
            "struct" => RefKind::Struct,
            "type" => RefKind::Type,
            "vfunc" => RefKind::Vfunc,
            "property" => RefKind::Property,
            "signal" => RefKind::Signal,
            "alias" => RefKind::Alias,
            "callback" => RefKind::Callback,
            _ => return None,
        })
    }
}

/// One row of a [`Element::Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Inline content of each cell.
    pub cells: Vec<Vec<Element>>,
    /// The row sits above a separator and is drawn with an `=` border below.
    pub header: bool,
}

/// A node of the intermediate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    // Block level
    Paragraph(Vec<Element>),
    Heading {
        level: u8,
        children: Vec<Element>,
    },
    /// A run of [`Element::ListItem`]s sharing a marker family.
    List {
        kind: ListKind,
        items: Vec<Element>,
    },
    /// Block children of one list item.
    ListItem(Vec<Element>),
    BlockQuote(Vec<Element>),
    CodeBlock {
        language: Option<String>,
        lines: Vec<String>,
    },
    Table {
        rows: Vec<TableRow>,
    },

    // Inline
    Text(String),
    Emphasis(Vec<Element>),
    Strong(Vec<Element>),
    InlineCode(String),
    Link {
        href: String,
        children: Vec<Element>,
    },
    /// An image; paragraphs are split around it when serialized.
    Image {
        src: String,
        alt: Option<String>,
    },
    KeyboardKey(String),
    /// Transparent grouping, e.g. `<note>`.
    Span(Vec<Element>),
    /// Markup passed through verbatim.
    Literal(String),

    // References
    /// `@param`.
    ParameterRef(String),
    /// `%CONSTANT`; `None` when unresolved.
    ConstantRef {
        name: String,
        target: Option<Target>,
    },
    /// `#Type`; `None` when unresolved.
    CTypeRef {
        name: String,
        target: Option<Target>,
    },
    /// `symbol()`; `name` keeps the parentheses. `target` is the dotted path.
    CSymbolRef {
        name: String,
        target: Option<String>,
    },
    /// `[kind@Target]`.
    DocCrossRef {
        kind: RefKind,
        target: Target,
    },
}

impl Element {
    /// Whether this element sits at block level.
    pub fn is_block(&self) -> bool {
        match self {
            Element::Paragraph(_)
            | Element::Heading { .. }
            | Element::List { .. }
            | Element::ListItem(_)
            | Element::BlockQuote(_)
            | Element::CodeBlock { .. }
            | Element::Table { .. } => true,
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
            | Element::DocCrossRef { .. } => false,
        }
    }

    /// Concatenated display text of this element and its children.
    pub fn plain_text(&self, out: &mut String) {
        match self {
            Element::Paragraph(children)
            | Element::Heading { children, .. }
            | Element::ListItem(children)
            | Element::BlockQuote(children)
            | Element::Emphasis(children)
            | Element::Strong(children)
            | Element::Link { children, .. }
            | Element::Span(children) => {
                for child in children {
                    child.plain_text(out);
                }
            }
            Element::List { items, .. } => {
                for item in items {
                    item.plain_text(out);
                }
            }
            Element::CodeBlock { lines, .. } => out.push_str(&lines.join("\n")),
            Element::Table { rows } => {
                for cell in rows.iter().flat_map(|row| row.cells.iter()) {
                    for child in cell {
                        child.plain_text(out);
                    }
                }
            }
            Element::Text(text)
            | Element::InlineCode(text)
            | Element::KeyboardKey(text)
            | Element::Literal(text)
            | Element::ParameterRef(text) => out.push_str(text),
            Element::Image { alt, .. } => out.push_str(alt.as_deref().unwrap_or("")),
            Element::ConstantRef { name, .. }
            | Element::CTypeRef { name, .. }
            | Element::CSymbolRef { name, .. } => out.push_str(name),
            Element::DocCrossRef { target, .. } => match target {
                Target::Api { path, .. } => out.push_str(path),
                Target::Builtin { name, .. } => out.push_str(name),
                Target::Code(code) => out.push_str(code),
            },
        }
    }
}

/// Concatenated display text of a slice of elements.
pub fn plain_text(elements: &[Element]) -> String {
    let mut out = String::new();
    for element in elements {
        element.plain_text(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_kind_tags() {
        assert_eq!(RefKind::from_tag("class"), Some(RefKind::Class));
        assert_eq!(RefKind::from_tag("signal"), Some(RefKind::Signal));
        assert_eq!(RefKind::from_tag("widget"), None);
    }

    #[test]
    fn test_plain_text_flattens() {
        let elements = vec![
            Element::Text("see ".to_string()),
            Element::InlineCode("gtk_init".to_string()),
            Element::Emphasis(vec![Element::Text(" now".to_string())]),
        ];
        assert_eq!(plain_text(&elements), "see gtk_init now");
    }

    #[test]
    fn test_is_block() {
        assert!(Element::Paragraph(Vec::new()).is_block());
        assert!(!Element::Text(String::new()).is_block());
    }
}
