//! Configuration types deserialized from `recomp.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// Default number of pending disk writes the background writer will queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// The full contents of a `recomp.toml` file.
///
/// Every table is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    /// Per-package caching behaviour.
    #[serde(default)]
    pub cache: ScopeConfig,
    /// Background disk writer tuning.
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Configuration attached to one caching scope (one package root).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
    /// Name of a registered parser that replaces the compiler's default parser.
    #[serde(default)]
    pub parser: Option<String>,
    /// Directory that compiled output is promoted to. Relative paths are
    /// resolved against the package root.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    /// When `false`, files in this package bypass both caching and compilation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            parser: None,
            cache_path: None,
            enabled: true,
        }
    }
}

impl ScopeConfig {
    /// Returns the part of the configuration that can change compiler output.
    ///
    /// Only the parser override qualifies. The cache location and the enabled
    /// flag decide where results live, not what they are.
    pub fn output_fingerprint(&self) -> &str {
        self.parser.as_deref().unwrap_or("")
    }
}

/// Settings for the background disk writer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriterConfig {
    /// Maximum number of writes waiting in the queue. Requests beyond this are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_defaults_enabled() {
        let config = ScopeConfig::default();
        assert!(config.enabled);
        assert!(config.parser.is_none());
        assert!(config.cache_path.is_none());
    }

    #[test]
    fn fingerprint_ignores_cache_path() {
        let a = ScopeConfig {
            parser: Some("acorn".to_string()),
            cache_path: Some(PathBuf::from(".cache")),
            enabled: true,
        };
        let b = ScopeConfig {
            parser: Some("acorn".to_string()),
            cache_path: None,
            enabled: true,
        };
        assert_eq!(a.output_fingerprint(), b.output_fingerprint());
        assert_eq!(ScopeConfig::default().output_fingerprint(), "");
    }

    #[test]
    fn writer_default_capacity() {
        assert_eq!(WriterConfig::default().queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
