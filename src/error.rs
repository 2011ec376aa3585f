//! Error types.
//!
//! Translation itself never fails; only loading a registry can.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a GIR registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The GIR file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The GIR file is not well-formed XML.
    #[error("invalid XML in '{}': {message}", path.display())]
    Xml { path: PathBuf, message: String },

    /// The document has no `<namespace>` element.
    #[error("no <namespace> element in '{}'", path.display())]
    MissingNamespace { path: PathBuf },

    /// No GIR file for the namespace exists on the search path.
    #[error("no GIR file found for '{namespace}-{version}'")]
    NotFound { namespace: String, version: String },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RegistryError::NotFound {
            namespace: "Gtk".to_string(),
            version: "4.0".to_string(),
        };
        assert_eq!(err.to_string(), "no GIR file found for 'Gtk-4.0'");

        let err = RegistryError::MissingNamespace {
            path: PathBuf::from("/usr/share/gir-1.0/Empty-1.0.gir"),
        };
        assert_eq!(
            err.to_string(),
            "no <namespace> element in '/usr/share/gir-1.0/Empty-1.0.gir'"
        );
    }

    #[test]
    fn test_io_source() {
        use std::error::Error as _;

        let err = RegistryError::Io {
            path: PathBuf::from("x.gir"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("failed to read 'x.gir'"));
    }
}
