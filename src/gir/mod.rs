//! GObject-Introspection registry files.
//!
//! A `.gir` file is read once into owned lookup tables; the XML document is
//! dropped after indexing. The resulting [`Registry`] is immutable and
//! answers both the [`SymbolResolver`] queries and the documentation queries
//! page generators need.

mod cache;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rustc_hash::FxHashMap;
use sxd_document::QName;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::resolve::SymbolResolver;

pub use cache::{RegistryCache, default_search_dirs};

const CORE_NS: &str = "http://www.gtk.org/introspection/core/1.0";
const C_NS: &str = "http://www.gtk.org/introspection/c/1.0";
const GLIB_NS: &str = "http://www.gtk.org/introspection/glib/1.0";

/// Top-level elements that declare a type.
const TYPE_ELEMENTS: &[&str] = &[
    "class",
    "interface",
    "record",
    "union",
    "enumeration",
    "bitfield",
    "alias",
    "callback",
    "boxed",
];

/// Kind of a member nested inside a type entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Constructor,
    Method,
    Function,
    VirtualMethod,
    Property,
    Signal,
    Field,
}

impl MemberKind {
    /// Map an element's local name to a member kind.
    fn from_element(local: &str) -> Option<Self> {
        Some(match local {
            "constructor" => Self::Constructor,
            "method" => Self::Method,
            "function" => Self::Function,
            "virtual-method" => Self::VirtualMethod,
            "property" => Self::Property,
            "signal" => Self::Signal,
            "field" => Self::Field,
            _ => return None,
        })
    }

    /// The GIR element name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constructor => "constructor",
            Self::Method => "method",
            Self::Function => "function",
            Self::VirtualMethod => "virtual-method",
            Self::Property => "property",
            Self::Signal => "glib:signal",
            Self::Field => "field",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let local = s.strip_prefix("glib:").unwrap_or(s);
        Self::from_element(local).ok_or_else(|| {
            format!(
                "unknown member kind '{s}' (expected constructor, method, function, \
                 virtual-method, property, signal or field)"
            )
        })
    }
}

/// Deprecation marker of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deprecation {
    /// Version the entry was deprecated in, if recorded.
    pub version: Option<String>,
    /// The `<doc-deprecated>` text, if any.
    pub doc: Option<String>,
}

/// A documented callable parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name as declared in C.
    pub name: String,
    /// The parameter's `<doc>` text.
    pub doc: Option<String>,
}

/// A member of a type entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Element the member was declared with.
    pub kind: MemberKind,
    /// Its documentation, parameters and nested members.
    pub entry: Entry,
}

/// One named, documented node of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// The GIR `name` attribute, without namespace.
    pub name: String,
    /// The `<doc>` text, untranslated.
    pub doc: Option<String>,
    /// Present when the entry is marked deprecated.
    pub deprecated: Option<Deprecation>,
    /// The `version` attribute: the release that introduced the entry.
    pub since: Option<String>,
    /// Declared parameters in order, without the instance parameter.
    pub parameters: Vec<Parameter>,
    /// The `<return-value>` doc text.
    pub return_doc: Option<String>,
    /// Nested constructors, methods, properties, signals and so on.
    pub members: Vec<Member>,
}

impl Entry {
    /// Find a member by kind and name.
    pub fn member(&self, kind: MemberKind, name: &str) -> Option<&Entry> {
        self.members
            .iter()
            .find(|member| member.kind == kind && member.entry.name == name)
            .map(|member| &member.entry)
    }

    /// Documentation of the parameter named `name`.
    pub fn parameter_doc(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|param| param.name == name)
            .and_then(|param| param.doc.as_deref())
    }
}

/// An indexed GIR namespace.
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    namespace: String,
    version: String,
    dependencies: Vec<String>,
    /// C type name → `NS.Type`.
    types: FxHashMap<String, String>,
    /// C identifier → `NS.function` or `NS.Type.method`.
    symbols: FxHashMap<String, String>,
    /// C constant name → `NS.CONSTANT` or `NS.Enum.MEMBER`.
    constants: FxHashMap<String, String>,
    entries: FxHashMap<String, Entry>,
}

/// Text content of an element's direct text children.
fn text_of(element: Element<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        if let ChildOfElement::Text(t) = child {
            text.push_str(t.text());
        }
    }
    text
}

/// Child elements with a local name, in document order.
fn child_elements<'d>(element: Element<'d>) -> impl Iterator<Item = Element<'d>> {
    element.children().into_iter().filter_map(|child| match child {
        ChildOfElement::Element(e) => Some(e),
        _ => None,
    })
}

fn child_text(element: Element<'_>, local: &str) -> Option<String> {
    child_elements(element)
        .find(|e| e.name().local_part() == local)
        .map(text_of)
}

fn c_attr<'d>(element: Element<'d>, local: &str) -> Option<&'d str> {
    element.attribute_value(QName::with_namespace_uri(Some(C_NS), local))
}

fn glib_attr<'d>(element: Element<'d>, local: &str) -> Option<&'d str> {
    element.attribute_value(QName::with_namespace_uri(Some(GLIB_NS), local))
}

/// Read the documentation-bearing parts of `element`.
fn read_entry(element: Element<'_>, name: &str) -> Entry {
    let deprecated = element
        .attribute_value("deprecated")
        .filter(|value| *value != "0")
        .map(|_| Deprecation {
            version: element.attribute_value("deprecated-version").map(str::to_string),
            doc: child_text(element, "doc-deprecated"),
        });

    let mut entry = Entry {
        name: name.to_string(),
        doc: child_text(element, "doc"),
        deprecated,
        since: element.attribute_value("version").map(str::to_string),
        ..Entry::default()
    };

    for child in child_elements(element) {
        match child.name().local_part() {
            "parameters" => {
                entry.parameters = child_elements(child)
                    .filter(|param| param.name().local_part() == "parameter")
                    .filter_map(|param| {
                        Some(Parameter {
                            name: param.attribute_value("name")?.to_string(),
                            doc: child_text(param, "doc"),
                        })
                    })
                    .collect();
            }
            "return-value" => entry.return_doc = child_text(child, "doc"),
            _ => {}
        }
    }

    entry
}

impl Registry {
    /// Index a GIR document held in memory.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_at(xml, Path::new("<memory>"))
    }

    /// Read and index a GIR file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_at(&xml, path)
    }

    fn parse_at(xml: &str, path: &Path) -> Result<Self> {
        let package = sxd_document::parser::parse(xml).map_err(|e| RegistryError::Xml {
            path: path.to_path_buf(),
            message: format!("{e:?}"),
        })?;
        let document = package.as_document();

        let repository = document
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(e) => Some(e),
                _ => None,
            })
            .ok_or_else(|| RegistryError::MissingNamespace {
                path: path.to_path_buf(),
            })?;

        let mut dependencies = Vec::new();
        let mut namespace_element = None;
        for child in child_elements(repository) {
            if child.name().namespace_uri() != Some(CORE_NS) {
                continue;
            }
            match child.name().local_part() {
                "include" => {
                    if let (Some(name), Some(version)) =
                        (child.attribute_value("name"), child.attribute_value("version"))
                    {
                        dependencies.push(format!("{name}-{version}"));
                    }
                }
                "namespace" => namespace_element = Some(child),
                _ => {}
            }
        }

        let namespace_element = namespace_element.ok_or_else(|| RegistryError::MissingNamespace {
            path: path.to_path_buf(),
        })?;
        let (Some(namespace), Some(version)) = (
            namespace_element.attribute_value("name"),
            namespace_element.attribute_value("version"),
        ) else {
            return Err(RegistryError::MissingNamespace {
                path: path.to_path_buf(),
            });
        };

        let mut registry = Self {
            path: path.to_path_buf(),
            namespace: namespace.to_string(),
            version: version.to_string(),
            dependencies,
            types: FxHashMap::default(),
            symbols: FxHashMap::default(),
            constants: FxHashMap::default(),
            entries: FxHashMap::default(),
        };
        registry.index(namespace_element);

        debug!(
            namespace = %registry.namespace,
            version = %registry.version,
            entries = registry.entries.len(),
            "indexed registry"
        );
        Ok(registry)
    }

    fn index(&mut self, namespace_element: Element<'_>) {
        let ns = self.namespace.clone();

        for node in child_elements(namespace_element) {
            let local = node.name().local_part();
            let Some(name) = node.attribute_value("name") else {
                continue;
            };
            let path = format!("{ns}.{name}");

            if TYPE_ELEMENTS.contains(&local) {
                for c_name in [c_attr(node, "type"), glib_attr(node, "type-name")]
                    .into_iter()
                    .flatten()
                {
                    self.types.entry(c_name.to_string()).or_insert_with(|| path.clone());
                }
            }

            match local {
                "function" => {
                    if let Some(identifier) = c_attr(node, "identifier") {
                        self.symbols.insert(identifier.to_string(), path.clone());
                    }
                }
                "constant" => {
                    if let Some(c_type) = c_attr(node, "type") {
                        self.constants.insert(c_type.to_string(), path.clone());
                    }
                }
                _ => {}
            }

            let mut entry = read_entry(node, name);
            for child in child_elements(node) {
                let child_local = child.name().local_part();
                if child_local == "member" && matches!(local, "enumeration" | "bitfield") {
                    if let (Some(identifier), Some(member)) =
                        (c_attr(child, "identifier"), child.attribute_value("name"))
                    {
                        self.constants.insert(
                            identifier.to_string(),
                            format!("{path}.{}", member.to_ascii_uppercase()),
                        );
                    }
                    continue;
                }

                let Some(kind) = MemberKind::from_element(child_local) else {
                    continue;
                };
                let Some(member_name) = child.attribute_value("name") else {
                    continue;
                };
                if matches!(
                    kind,
                    MemberKind::Constructor | MemberKind::Method | MemberKind::Function
                ) {
                    if let Some(identifier) = c_attr(child, "identifier") {
                        self.symbols
                            .insert(identifier.to_string(), format!("{path}.{member_name}"));
                    }
                }
                entry.members.push(Member {
                    kind,
                    entry: read_entry(child, member_name),
                });
            }

            self.entries.insert(name.to_string(), entry);
        }
    }

    /// File the registry was read from (`<memory>` for [`Registry::parse`]).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Namespace name and version, e.g. `("Gtk", "4.0")`.
    pub fn namespace(&self) -> (&str, &str) {
        (&self.namespace, &self.version)
    }

    /// Included namespaces as `Name-Version`.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Look up a top-level entry by its GIR name.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Untranslated `<doc>` text of a top-level entry.
    pub fn doc(&self, name: &str) -> Option<&str> {
        self.entry(name)?.doc.as_deref()
    }

    /// Documentation of parameter `param` of the callable `func`.
    pub fn parameter_doc(&self, func: &str, param: &str) -> Option<&str> {
        self.entry(func)?.parameter_doc(param)
    }

    /// Documentation of an entry's return value.
    pub fn return_doc(&self, name: &str) -> Option<&str> {
        self.entry(name)?.return_doc.as_deref()
    }

    /// Deprecation marker of an entry, if it is deprecated.
    pub fn deprecated(&self, name: &str) -> Option<&Deprecation> {
        self.entry(name)?.deprecated.as_ref()
    }

    /// Release that introduced an entry.
    pub fn since(&self, name: &str) -> Option<&str> {
        self.entry(name)?.since.as_deref()
    }

    /// Find a member of `class`.
    ///
    /// A call suffix on `name` (`notify(...)`) is ignored. Members missing on
    /// the class itself are looked up on its `{class}Class` struct.
    pub fn member(&self, kind: MemberKind, class: &str, name: &str) -> Option<&Entry> {
        let name = name.split_once('(').map_or(name, |(bare, _)| bare);
        let owner = self.entry(class)?;
        owner
            .member(kind, name)
            .or_else(|| self.entry(&format!("{class}Class"))?.member(kind, name))
    }

    /// `<doc>` text of a member; see [`Registry::member`] for the lookup.
    pub fn member_doc(&self, kind: MemberKind, class: &str, name: &str) -> Option<&str> {
        self.member(kind, class, name)?.doc.as_deref()
    }

    /// Documentation of one parameter of a member callable.
    pub fn member_parameter_doc(
        &self,
        kind: MemberKind,
        class: &str,
        name: &str,
        param: &str,
    ) -> Option<&str> {
        self.member(kind, class, name)?.parameter_doc(param)
    }

    /// Documentation of a member callable's return value.
    pub fn member_return_doc(&self, kind: MemberKind, class: &str, name: &str) -> Option<&str> {
        self.member(kind, class, name)?.return_doc.as_deref()
    }
}

/// Strip `const` qualifiers, pointer stars and whitespace from a C type.
fn bare_type(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '*')
        .filter(|word| !word.is_empty() && *word != "const")
        .collect()
}

impl SymbolResolver for Registry {
    fn resolve_type(&self, name: &str) -> Option<String> {
        let bare = bare_type(name);
        self.types
            .get(&bare)
            .or_else(|| self.types.get(bare.strip_suffix('s')?))
            .cloned()
    }

    fn resolve_symbol(&self, name: &str) -> Option<String> {
        self.symbols.get(name).cloned()
    }

    fn resolve_constant(&self, name: &str) -> Option<String> {
        self.constants.get(name).cloned()
    }

    fn namespace(&self) -> Option<(&str, &str)> {
        Some(Registry::namespace(self))
    }
}
