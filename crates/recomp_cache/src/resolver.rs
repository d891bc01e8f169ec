//! Mapping input directories to caching scopes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use recomp_config::{load_config, resolve_cache_root, CacheSettings, ConfigError, ScopeConfig};

use crate::scope::Scope;

/// Resolves the scope that governs files in a directory.
///
/// Returning `None` disables both caching and compilation for that
/// directory: the caller passes its input through untouched.
pub trait ScopeResolver: Send + Sync {
    /// Returns the shared scope for `dir`, or `None` if caching is disabled there.
    fn resolve(&self, dir: &Path) -> Option<Arc<Scope>>;
}

impl<F> ScopeResolver for F
where
    F: Fn(&Path) -> Option<Arc<Scope>> + Send + Sync,
{
    fn resolve(&self, dir: &Path) -> Option<Arc<Scope>> {
        self(dir)
    }
}

#[derive(Debug)]
struct Package {
    config: ScopeConfig,
    scope: OnceLock<Arc<Scope>>,
}

/// Registry of package roots and their lazily created scopes.
///
/// A directory belongs to the nearest registered ancestor (itself included).
/// Each package's scope is created the first time one of its directories is
/// resolved, warmed from its disk cache, and then shared by every later call.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    packages: RwLock<BTreeMap<PathBuf, Arc<Package>>>,
    directories: RwLock<HashMap<PathBuf, Option<PathBuf>>>,
}

impl ScopeRegistry {
    /// Creates an empty registry. Until a package is registered every
    /// directory resolves to `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `root` as a package root governed by `config`.
    ///
    /// Re-registering a root replaces its configuration and discards any scope
    /// already created for it.
    pub fn register(&self, root: impl Into<PathBuf>, config: ScopeConfig) {
        let root = root.into();
        tracing::debug!(
            target: "recomp.cache",
            root = %root.display(),
            enabled = config.enabled,
            "registered package"
        );
        self.packages.write().insert(
            root,
            Arc::new(Package {
                config,
                scope: OnceLock::new(),
            }),
        );
        self.directories.write().clear();
    }

    /// Registers `root` using the `recomp.toml` found there.
    ///
    /// A missing configuration file registers the package with defaults.
    /// Returns the loaded settings so the caller can configure its writer.
    pub fn load_package(&self, root: impl Into<PathBuf>) -> Result<CacheSettings, ConfigError> {
        let root = root.into();
        let settings = match load_config(&root) {
            Ok(settings) => settings,
            Err(ConfigError::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                CacheSettings::default()
            }
            Err(err) => return Err(err),
        };
        self.register(root, settings.cache.clone());
        Ok(settings)
    }

    /// Returns the number of registered package roots.
    pub fn package_count(&self) -> usize {
        self.packages.read().len()
    }

    fn package_root_for(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(root) = self.directories.read().get(dir) {
            return root.clone();
        }

        // Hold the package map while memoizing so a concurrent `register`
        // cannot leave a stale answer behind.
        let packages = self.packages.read();
        let root = dir
            .ancestors()
            .find(|candidate| packages.contains_key(*candidate))
            .map(Path::to_path_buf);
        self.directories
            .write()
            .insert(dir.to_path_buf(), root.clone());
        root
    }
}

impl ScopeResolver for ScopeRegistry {
    fn resolve(&self, dir: &Path) -> Option<Arc<Scope>> {
        let root = self.package_root_for(dir)?;
        let package = self.packages.read().get(&root).cloned()?;

        if !package.config.enabled {
            tracing::debug!(
                target: "recomp.cache",
                dir = %dir.display(),
                root = %root.display(),
                "caching disabled for package"
            );
            return None;
        }

        let scope = package.scope.get_or_init(|| {
            let cache_root = resolve_cache_root(&package.config, &root);
            let scope = Scope::new(package.config.clone(), cache_root);
            let loaded = scope.warm_from_disk();
            tracing::debug!(
                target: "recomp.cache",
                root = %root.display(),
                loaded,
                "created package scope"
            );
            Arc::new(scope)
        });
        Some(Arc::clone(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactStore;

    #[test]
    fn unregistered_directory_has_no_scope() {
        let registry = ScopeRegistry::new();
        assert!(registry.resolve(Path::new("/pkg/src")).is_none());
    }

    #[test]
    fn nested_directories_share_one_scope() {
        let registry = ScopeRegistry::new();
        registry.register("/pkg", ScopeConfig::default());

        let a = registry.resolve(Path::new("/pkg")).unwrap();
        let b = registry.resolve(Path::new("/pkg/src/deep")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn nearest_root_wins() {
        let registry = ScopeRegistry::new();
        registry.register("/pkg", ScopeConfig::default());
        registry.register(
            "/pkg/vendor/lib",
            ScopeConfig {
                parser: Some("custom".to_string()),
                ..ScopeConfig::default()
            },
        );

        let outer = registry.resolve(Path::new("/pkg/src")).unwrap();
        let inner = registry.resolve(Path::new("/pkg/vendor/lib/src")).unwrap();
        assert!(!Arc::ptr_eq(&outer, &inner));
        assert_eq!(inner.config().parser.as_deref(), Some("custom"));
        assert!(outer.config().parser.is_none());
    }

    #[test]
    fn disabled_package_resolves_to_none() {
        let registry = ScopeRegistry::new();
        registry.register(
            "/pkg",
            ScopeConfig {
                enabled: false,
                ..ScopeConfig::default()
            },
        );
        assert!(registry.resolve(Path::new("/pkg/src")).is_none());
    }

    #[test]
    fn registering_later_invalidates_directory_memo() {
        let registry = ScopeRegistry::new();
        assert!(registry.resolve(Path::new("/pkg/src")).is_none());
        registry.register("/pkg", ScopeConfig::default());
        assert!(registry.resolve(Path::new("/pkg/src")).is_some());
    }

    #[test]
    fn relative_cache_path_resolves_against_root() {
        let registry = ScopeRegistry::new();
        registry.register(
            "/pkg",
            ScopeConfig {
                cache_path: Some(PathBuf::from(".cache")),
                ..ScopeConfig::default()
            },
        );
        let scope = registry.resolve(Path::new("/pkg/src")).unwrap();
        assert_eq!(scope.cache_root(), Some(Path::new("/pkg/.cache")));
    }

    #[test]
    fn scope_is_warmed_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join(".cache");
        ArtifactStore::new(&cache_dir)
            .write_text("abc.cache", "warm")
            .unwrap();

        let registry = ScopeRegistry::new();
        registry.register(
            dir.path(),
            ScopeConfig {
                cache_path: Some(PathBuf::from(".cache")),
                ..ScopeConfig::default()
            },
        );
        let scope = registry.resolve(dir.path()).unwrap();
        assert_eq!(scope.get("abc.cache").as_deref(), Some("warm"));
    }

    #[test]
    fn load_package_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("recomp.toml"),
            "[cache]\nparser = \"acorn\"\n\n[writer]\nqueue_capacity = 8\n",
        )
        .unwrap();

        let registry = ScopeRegistry::new();
        let settings = registry.load_package(dir.path()).unwrap();
        assert_eq!(settings.writer.queue_capacity, 8);

        let scope = registry.resolve(&dir.path().join("src")).unwrap();
        assert_eq!(scope.config().parser.as_deref(), Some("acorn"));
    }

    #[test]
    fn load_package_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ScopeRegistry::new();
        let settings = registry.load_package(dir.path()).unwrap();
        assert_eq!(settings, CacheSettings::default());
        assert_eq!(registry.package_count(), 1);
        assert!(registry.resolve(dir.path()).is_some());
    }

    #[test]
    fn load_package_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("recomp.toml"), "[cache]\nparser = \"\"\n").unwrap();
        let registry = ScopeRegistry::new();
        assert!(matches!(
            registry.load_package(dir.path()),
            Err(ConfigError::ValidationError(_))
        ));
        assert_eq!(registry.package_count(), 0);
    }

    #[test]
    fn closures_are_resolvers() {
        let scope = Arc::new(Scope::fallback());
        let shared = Arc::clone(&scope);
        let resolver = move |_: &Path| Some(Arc::clone(&shared));
        let resolved = resolver.resolve(Path::new("/anywhere")).unwrap();
        assert!(Arc::ptr_eq(&resolved, &scope));
    }
}
