//! Resolution of configured paths against a package root.

use crate::types::ScopeConfig;
use std::path::{Path, PathBuf};

/// Resolves the configured disk-cache directory for a package.
///
/// Absolute paths are used as-is; relative paths are joined onto
/// `package_root`. Returns `None` when no cache directory is configured.
pub fn resolve_cache_root(config: &ScopeConfig, package_root: &Path) -> Option<PathBuf> {
    let cache_path = config.cache_path.as_ref()?;
    if cache_path.is_absolute() {
        Some(cache_path.clone())
    } else {
        Some(package_root.join(cache_path))
    }
}
