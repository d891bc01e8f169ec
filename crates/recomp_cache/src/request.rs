//! Per-call compile requests.

use std::path::{Path, PathBuf};

use crate::key::CacheKey;

/// Filename hosts use for interactive input that has no backing file.
pub const REPL_FILENAME: &str = "repl";

/// Describes one input handed to [`CachingCompiler::compile`](crate::CachingCompiler::compile).
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    filename: Option<PathBuf>,
    cache_key: CacheKey,
}

impl CompileRequest {
    /// A request with no filename, keyed on content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path of the file the input came from.
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Overrides content-based keying.
    pub fn with_cache_key(mut self, cache_key: impl Into<CacheKey>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    /// Returns the input's filename.
    ///
    /// Empty names and [`REPL_FILENAME`] count as no filename.
    pub fn filename(&self) -> Option<&Path> {
        self.filename
            .as_deref()
            .filter(|f| !f.as_os_str().is_empty() && f.as_os_str() != REPL_FILENAME)
    }

    /// Returns the cache key for this request.
    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }
}
