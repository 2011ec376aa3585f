//! Symbol resolution.
//!
//! The translator never owns a registry; it asks a [`SymbolResolver`] for
//! canonical paths and falls back to literal rendering on a miss.

use crate::tree::{Role, Target};

/// Read-only query surface over a namespace registry.
///
/// Every lookup answers `None` on a miss and never fails.
pub trait SymbolResolver {
    /// Resolve a C type name (`GtkWidget`, `const GList *`) to `NS.Name`.
    fn resolve_type(&self, name: &str) -> Option<String>;

    /// Resolve a C callable identifier to `NS.Class.method` or `NS.function`.
    fn resolve_symbol(&self, name: &str) -> Option<String>;

    /// Resolve a symbolic constant (`GTK_ALIGN_START`) to its dotted path.
    fn resolve_constant(&self, name: &str) -> Option<String>;

    /// The registry's own namespace and version.
    fn namespace(&self) -> Option<(&str, &str)>;
}

/// Resolver that answers every query with "not found".
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl SymbolResolver for Unresolved {
    fn resolve_type(&self, _name: &str) -> Option<String> {
        None
    }

    fn resolve_symbol(&self, _name: &str) -> Option<String> {
        None
    }

    fn resolve_constant(&self, _name: &str) -> Option<String> {
        None
    }

    fn namespace(&self) -> Option<(&str, &str)> {
        None
    }
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &R {
    fn resolve_type(&self, name: &str) -> Option<String> {
        (**self).resolve_type(name)
    }

    fn resolve_symbol(&self, name: &str) -> Option<String> {
        (**self).resolve_symbol(name)
    }

    fn resolve_constant(&self, name: &str) -> Option<String> {
        (**self).resolve_constant(name)
    }

    fn namespace(&self) -> Option<(&str, &str)> {
        (**self).namespace()
    }
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for std::sync::Arc<R> {
    fn resolve_type(&self, name: &str) -> Option<String> {
        (**self).resolve_type(name)
    }

    fn resolve_symbol(&self, name: &str) -> Option<String> {
        (**self).resolve_symbol(name)
    }

    fn resolve_constant(&self, name: &str) -> Option<String> {
        (**self).resolve_constant(name)
    }

    fn namespace(&self) -> Option<(&str, &str)> {
        (**self).namespace()
    }
}

/// Shape of a builtin constant's rendering.
#[derive(Debug, Clone, Copy)]
enum Builtin {
    /// `:role:`name`` with an optional plain-text qualifier in front.
    Object(&'static str, Role, &'static str),
    /// A path under the module prefix.
    Api(Role, &'static str),
    /// Plain inline code.
    Code(&'static str),
}

/// Constants with a fixed Python rendering, checked before the registry.
const BUILTIN_CONSTANTS: &[(&str, Builtin)] = &[
    ("TRUE", Builtin::Object("", Role::Const, "True")),
    ("FALSE", Builtin::Object("", Role::Const, "False")),
    ("NULL", Builtin::Object("", Role::Const, "None")),
    ("G_TYPE_CHAR", Builtin::Object("", Role::Obj, "int")),
    ("G_TYPE_INT", Builtin::Object("", Role::Obj, "int")),
    ("G_TYPE_INT64", Builtin::Object("", Role::Obj, "int")),
    ("G_TYPE_LONG", Builtin::Object("", Role::Obj, "int")),
    ("G_TYPE_UCHAR", Builtin::Object("unsigned ", Role::Obj, "int")),
    ("G_TYPE_UINT", Builtin::Object("unsigned ", Role::Obj, "int")),
    ("G_TYPE_UINT64", Builtin::Object("unsigned ", Role::Obj, "int")),
    ("G_TYPE_ULONG", Builtin::Object("unsigned ", Role::Obj, "int")),
    ("G_TYPE_OBJECT", Builtin::Object("", Role::Obj, "object")),
    ("G_TYPE_PARAM", Builtin::Api(Role::Obj, "GObject.ParamSpec")),
    ("G_TYPE_BOXED", Builtin::Code("Boxed")),
    ("G_TYPE_STRING", Builtin::Object("", Role::Obj, "str")),
    ("G_TYPE_FLOAT", Builtin::Object("", Role::Obj, "float")),
    ("G_TYPE_BOOLEAN", Builtin::Object("", Role::Obj, "bool")),
    ("G_TYPE_DOUBLE", Builtin::Object("", Role::Obj, "float")),
    ("G_TYPE_ENUM", Builtin::Code("Enum")),
    ("G_TYPE_FLAGS", Builtin::Code("Flags")),
    ("G_TYPE_GTYPE", Builtin::Code("GType")),
    ("G_TYPE_INVALID", Builtin::Code("Invalid")),
];

/// Look up a `%CONSTANT` in the builtin table.
pub fn builtin_constant(name: &str) -> Option<Target> {
    let (_, builtin) = BUILTIN_CONSTANTS.iter().find(|(key, _)| *key == name)?;
    Some(match *builtin {
        Builtin::Object(qualifier, role, name) => Target::Builtin {
            qualifier,
            role,
            name,
        },
        Builtin::Api(role, path) => Target::Api {
            role,
            path: path.to_string(),
        },
        Builtin::Code(code) => Target::Code(code.to_string()),
    })
}

/// Map a C fundamental type name (`#gint`, `#gboolean`) to a Python builtin.
pub fn builtin_type(name: &str) -> Option<&'static str> {
    match name {
        "gboolean" => Some("bool"),
        "gdouble" | "gfloat" => Some("float"),
        "gchar" | "utf8" => Some("str"),
        "glong" | "gulong" | "gsize" | "gssize" | "gshort" | "gushort" => Some("int"),
        _ if name.starts_with("gint") || name.starts_with("guint") => Some("int"),
        _ => None,
    }
}
