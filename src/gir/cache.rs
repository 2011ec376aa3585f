//! Caller-owned cache of loaded registries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};
use crate::resolve::{SymbolResolver, Unresolved};

use super::Registry;

type Key = (String, String);

/// `gir-1.0` under every entry of `XDG_DATA_DIRS`
/// (default `/usr/local/share:/usr/share`).
pub fn default_search_dirs() -> Vec<PathBuf> {
    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|dirs| !dirs.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
    data_dirs
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join("gir-1.0"))
        .collect()
}

/// Loads each `(namespace, version)` at most once and shares the result.
///
/// Failed loads are remembered too, so a missing registry is looked for only
/// once. The cache is `Sync`; concurrent translations can share one.
#[derive(Debug)]
pub struct RegistryCache {
    search_dirs: Vec<PathBuf>,
    loaded: RwLock<FxHashMap<Key, Option<Arc<Registry>>>>,
}

impl Default for RegistryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryCache {
    /// Cache searching [`default_search_dirs`].
    pub fn new() -> Self {
        Self::with_search_dirs(default_search_dirs())
    }

    /// Cache searching `search_dirs`, in order.
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            loaded: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// First `{namespace}-{version}.gir` found on the search path.
    pub fn locate(&self, namespace: &str, version: &str) -> Option<PathBuf> {
        let file_name = format!("{namespace}-{version}.gir");
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// Add an already-loaded registry under its own namespace.
    pub fn insert(&self, registry: Registry) -> Arc<Registry> {
        let (namespace, version) = registry.namespace();
        let key = (namespace.to_string(), version.to_string());
        let registry = Arc::new(registry);
        self.loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Some(Arc::clone(&registry)));
        registry
    }

    /// Load the registry for `namespace`-`version`, reading it on first use.
    pub fn load(&self, namespace: &str, version: &str) -> Result<Arc<Registry>> {
        let key = (namespace.to_string(), version.to_string());
        let not_found = || RegistryError::NotFound {
            namespace: namespace.to_string(),
            version: version.to_string(),
        };

        if let Some(cached) = self
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return cached.clone().ok_or_else(not_found);
        }

        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have loaded it between the two locks
        if let Some(cached) = loaded.get(&key) {
            return cached.clone().ok_or_else(not_found);
        }

        let result = match self.locate(namespace, version) {
            Some(path) => Registry::from_file(&path),
            None => Err(not_found()),
        };
        match result {
            Ok(registry) => {
                debug!(namespace, version, path = %registry.path().display(), "loaded registry");
                let registry = Arc::new(registry);
                loaded.insert(key, Some(Arc::clone(&registry)));
                Ok(registry)
            }
            Err(err) => {
                loaded.insert(key, None);
                Err(err)
            }
        }
    }

    /// A resolver for `namespace`-`version`, or [`Unresolved`] when the
    /// registry cannot be loaded.
    pub fn resolver(&self, namespace: &str, version: &str) -> Arc<dyn SymbolResolver + Send + Sync> {
        match self.load(namespace, version) {
            Ok(registry) => registry as Arc<dyn SymbolResolver + Send + Sync>,
            Err(err @ RegistryError::NotFound { .. }) => {
                debug!(%err, "translating without cross-references");
                Arc::new(Unresolved)
            }
            Err(err) => {
                warn!(%err, "translating without cross-references");
                Arc::new(Unresolved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gir::tests::GTK_FIXTURE;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gtkdoc-rst-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_from_search_dir() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("Gtk-4.0.gir"), GTK_FIXTURE).unwrap();

        let cache = RegistryCache::with_search_dirs(vec![PathBuf::from("/nonexistent"), dir.clone()]);
        let first = cache.load("Gtk", "4.0").unwrap();
        let second = cache.load("Gtk", "4.0").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(Registry::namespace(&first), ("Gtk", "4.0"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_negative_result_is_cached() {
        let dir = scratch_dir("negative");
        let cache = RegistryCache::with_search_dirs(vec![dir.clone()]);
        assert!(matches!(
            cache.load("Gtk", "4.0"),
            Err(RegistryError::NotFound { .. })
        ));

        // Appearing later does not change the remembered miss
        std::fs::write(dir.join("Gtk-4.0.gir"), GTK_FIXTURE).unwrap();
        assert!(cache.load("Gtk", "4.0").is_err());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_invalid_file_degrades_to_unresolved() {
        let dir = scratch_dir("invalid");
        std::fs::write(dir.join("Broken-1.0.gir"), "<repository").unwrap();

        let cache = RegistryCache::with_search_dirs(vec![dir.clone()]);
        assert!(matches!(
            cache.load("Broken", "1.0"),
            Err(RegistryError::Xml { .. })
        ));
        let resolver = cache.resolver("Broken", "1.0");
        assert_eq!(resolver.namespace(), None);
        assert_eq!(resolver.resolve_type("GtkWidget"), None);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_insert_and_resolver() {
        let cache = RegistryCache::with_search_dirs(Vec::new());
        cache.insert(Registry::parse(GTK_FIXTURE).unwrap());
        let resolver = cache.resolver("Gtk", "4.0");
        assert_eq!(resolver.namespace(), Some(("Gtk", "4.0")));
        assert_eq!(resolver.resolve_type("GtkButton").as_deref(), Some("Gtk.Button"));
    }

    #[test]
    fn test_cache_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RegistryCache>();
    }
}
