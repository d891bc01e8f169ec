//! In-memory lookup and insertion, and the disk promotion decision.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::scope::Scope;

/// Where a promoted result should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Directory of the input file; the write is resolved relative to it.
    pub base_dir: PathBuf,
    /// Path of the artifact relative to `base_dir`.
    pub relative_path: PathBuf,
}

impl Promotion {
    /// Returns the path the artifact ends up at.
    pub fn target(&self) -> PathBuf {
        self.base_dir.join(&self.relative_path)
    }
}

/// Cache operations over a [`Scope`].
pub struct CacheStore;

impl CacheStore {
    /// Returns the stored result for `identifier`. Never touches the disk.
    pub fn lookup(scope: &Scope, identifier: &str) -> Option<Arc<str>> {
        scope.get(identifier)
    }

    /// Stores `code` under `identifier` and returns the value now in the map.
    pub fn store(scope: &Scope, identifier: String, code: String) -> Arc<str> {
        scope.insert(identifier, Arc::from(code))
    }

    /// Decides whether a freshly stored result should also go to disk.
    ///
    /// Promotion needs both a filename and a scope with a disk-cache root.
    /// The artifact path is `<cache_root>/<identifier>`, expressed relative to
    /// the directory containing `filename`.
    pub fn promotion(scope: &Scope, filename: Option<&Path>, identifier: &str) -> Option<Promotion> {
        let filename = filename?;
        let cache_root = scope.cache_root()?;

        let base_dir = filename.parent().unwrap_or_else(|| Path::new(""));
        let absolute = cache_root.join(identifier);
        let relative_path =
            pathdiff::diff_paths(&absolute, base_dir).unwrap_or_else(|| absolute.clone());

        Some(Promotion {
            base_dir: base_dir.to_path_buf(),
            relative_path,
        })
    }
}
