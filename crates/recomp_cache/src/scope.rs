//! Caching domains.
//!
//! A [`Scope`] bundles the in-memory result map for one package with that
//! package's configuration and optional disk-cache root. Scopes are shared
//! via `Arc` by every call whose input resolves to the same package.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use recomp_config::ScopeConfig;

use crate::artifact::ArtifactStore;

/// A caching domain: in-memory results plus the configuration they were built with.
///
/// Entries are write-once. The map lives as long as the scope and is never
/// evicted.
#[derive(Debug)]
pub struct Scope {
    config: ScopeConfig,
    cache_root: Option<PathBuf>,
    entries: RwLock<HashMap<String, Arc<str>>>,
}

impl Scope {
    /// Creates an empty scope.
    ///
    /// `cache_root` is the resolved disk-cache directory; when it is `None`
    /// results are only kept in memory. A relative root is anchored at the
    /// current directory so promotion and warming agree on where it is.
    pub fn new(config: ScopeConfig, cache_root: Option<PathBuf>) -> Self {
        let cache_root = cache_root.map(|root| {
            if root.is_absolute() {
                root
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(&root))
                    .unwrap_or(root)
            }
        });
        Self {
            config,
            cache_root,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates the in-memory-only scope used for input without a filename.
    pub fn fallback() -> Self {
        Self::new(ScopeConfig::default(), None)
    }

    /// Returns this scope's configuration.
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Returns the disk-cache directory, if promotion to disk is enabled.
    pub fn cache_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    /// Looks up a previously computed result.
    pub fn get(&self, identifier: &str) -> Option<Arc<str>> {
        self.entries.read().get(identifier).cloned()
    }

    /// Records a result under `identifier` and returns the stored value.
    ///
    /// If the identifier is already present the existing value wins and is
    /// returned unchanged.
    pub fn insert(&self, identifier: String, code: Arc<str>) -> Arc<str> {
        self.entries
            .write()
            .entry(identifier)
            .or_insert(code)
            .clone()
    }

    /// Returns `true` if a result is stored under `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    /// Returns the number of stored results.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no results are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Loads every valid artifact from the disk-cache directory into memory.
    ///
    /// Returns the number of entries added. Scopes without a cache root, or
    /// whose directory cannot be listed, load nothing.
    pub fn warm_from_disk(&self) -> usize {
        let Some(root) = self.cache_root.as_deref() else {
            return 0;
        };

        let artifacts = match ArtifactStore::new(root).load_all() {
            Ok(artifacts) => artifacts,
            Err(err) => {
                tracing::debug!(
                    target: "recomp.cache",
                    cache_root = %root.display(),
                    error = %err,
                    "failed to list disk cache"
                );
                return 0;
            }
        };

        let mut entries = self.entries.write();
        let mut loaded = 0;
        for (identifier, text) in artifacts {
            if !entries.contains_key(&identifier) {
                entries.insert(identifier, Arc::from(text));
                loaded += 1;
            }
        }
        loaded
    }
}
