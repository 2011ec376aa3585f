//! gtkdoc-rst: gtk-doc comment markup to reStructuredText
//!
//! Translates the documentation dialect found in GObject-Introspection
//! files (gtk-doc sigils mixed with Markdown) into reStructuredText, with
//! cross-references resolved against a namespace registry.
//!
//! # Design Principles
//! - Single forward pass: blocks are segmented lazily, inline constructs are
//!   recognized by one priority-ordered scan, so no pass can re-match the
//!   output of another
//! - Closed element tree: the writer is an exhaustive match
//! - Infallible translation: every unresolved reference has a literal
//!   fallback
//! - No global state: registries live in a caller-owned [`RegistryCache`]

pub mod block;
pub mod cursor;
pub mod error;
pub mod escape;
pub mod gir;
pub mod inline;
pub mod limits;
pub mod range;
pub mod render;
pub mod resolve;
pub mod table;
pub mod tree;

// Re-export primary types
pub use block::{Block, BlockParser};
pub use error::{RegistryError, Result};
pub use gir::{Registry, RegistryCache};
pub use inline::{InlineContext, InlineParser};
pub use range::Range;
pub use render::RstWriter;
pub use resolve::{SymbolResolver, Unresolved};
pub use tree::{Element, TreeBuilder};

/// Translation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Namespace prefixed to unqualified cross-references. `None` falls back
    /// to the resolver's own namespace.
    pub default_namespace: Option<String>,
    /// Prefix for relative image paths. Empty leaves paths unchanged.
    pub image_base_url: String,
    /// Python module that resolved API paths live under.
    pub module_prefix: String,
    /// Indentation of code-block bodies.
    pub code_indent: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_namespace: None,
            image_base_url: String::new(),
            module_prefix: "gi.repository".to_string(),
            code_indent: 3,
        }
    }
}

/// Translate gtk-doc markup to reStructuredText.
///
/// `default_namespace` qualifies unqualified cross-references; an empty
/// string means the resolver's own namespace. `None` or empty `text`
/// yields an empty string.
///
/// # Example
/// ```
/// use gtkdoc_rst::{Unresolved, translate};
///
/// let rst = translate("Returns %TRUE if @widget is visible.", &Unresolved, "", "");
/// assert_eq!(rst, "Returns :const:`True` if ``widget`` is visible.");
/// ```
pub fn translate<'t>(
    text: impl Into<Option<&'t str>>,
    resolver: &dyn SymbolResolver,
    default_namespace: &str,
    base_url: &str,
) -> String {
    let options = Options {
        default_namespace: Some(default_namespace)
            .filter(|namespace| !namespace.is_empty())
            .map(str::to_string),
        image_base_url: base_url.to_string(),
        ..Options::default()
    };
    translate_with_options(text, resolver, &options)
}

/// Translate gtk-doc markup to reStructuredText with options.
pub fn translate_with_options<'t>(
    text: impl Into<Option<&'t str>>,
    resolver: &dyn SymbolResolver,
    options: &Options,
) -> String {
    let Some(text) = text.into().filter(|text| !text.is_empty()) else {
        return String::new();
    };
    let elements = parse_document(text, resolver, options);
    let mut writer = RstWriter::with_capacity_for(text.len(), options);
    writer.write_blocks(&elements);
    writer.into_string()
}

/// Parse gtk-doc markup into the intermediate element tree.
pub fn parse_document(text: &str, resolver: &dyn SymbolResolver, options: &Options) -> Vec<Element> {
    let namespace = options
        .default_namespace
        .as_deref()
        .or_else(|| resolver.namespace().map(|(name, _)| name));
    let ctx = InlineContext {
        resolver,
        namespace,
        image_base_url: &options.image_base_url,
    };
    TreeBuilder::new(ctx).build(text)
}

/// Serialize an element tree to reStructuredText.
pub fn render_document(elements: &[Element], options: &Options) -> String {
    let mut writer = RstWriter::new(options);
    writer.write_blocks(elements);
    writer.into_string()
}
