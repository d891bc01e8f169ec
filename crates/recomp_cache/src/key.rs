//! Cache keys and cache identifiers.
//!
//! A [`CacheKey`] is the logical identity of an input. An
//! [`IdentifierDeriver`] turns the resolved key plus the scope configuration
//! into the string used both as the in-memory map key and as the on-disk
//! artifact name.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use recomp_common::ContentHash;
use recomp_config::ScopeConfig;

use crate::artifact::ARTIFACT_EXT;

/// Mixed into every derived identifier so a new release never reuses
/// results produced by an older one.
const IDENTIFIER_TAG: &str = concat!("recomp/", env!("CARGO_PKG_VERSION"));

/// Caller-supplied identity for an input.
#[derive(Clone, Default)]
pub enum CacheKey {
    /// Key on the raw input text.
    #[default]
    Content,
    /// Key on an explicit value, such as a precomputed hash.
    Value(String),
    /// Key on the value returned by a producer. A producer returning `None`
    /// falls back to the input text.
    Producer(Arc<dyn Fn() -> Option<String> + Send + Sync>),
}

impl CacheKey {
    /// Wraps a zero-argument producer.
    pub fn producer(f: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Producer(Arc::new(f))
    }

    /// Resolves the effective key for `source`. Producers run exactly once
    /// per call.
    pub fn resolve<'a>(&self, source: &'a str) -> Cow<'a, str> {
        match self {
            Self::Content => Cow::Borrowed(source),
            Self::Value(value) => Cow::Owned(value.clone()),
            Self::Producer(produce) => match produce() {
                Some(value) => Cow::Owned(value),
                None => Cow::Borrowed(source),
            },
        }
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => f.write_str("Content"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<ContentHash> for CacheKey {
    fn from(hash: ContentHash) -> Self {
        Self::Value(hash.to_string())
    }
}

/// Derives stable cache identifiers.
///
/// Implementations must be deterministic, and distinct keys under the same
/// configuration must map to distinct identifiers: entries are never
/// invalidated in place.
pub trait IdentifierDeriver: Send + Sync {
    /// Derives the identifier for `key` under `config`.
    fn derive(&self, key: &str, config: &ScopeConfig) -> String;
}

impl<F> IdentifierDeriver for F
where
    F: Fn(&str, &ScopeConfig) -> String + Send + Sync,
{
    fn derive(&self, key: &str, config: &ScopeConfig) -> String {
        self(key, config)
    }
}

/// Default identifier: an XXH3-128 hash of the release tag, the
/// output-affecting configuration, and the key, rendered as
/// `<32 hex digits>.cache`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedIdentifier;

impl IdentifierDeriver for HashedIdentifier {
    fn derive(&self, key: &str, config: &ScopeConfig) -> String {
        let hash = ContentHash::from_parts(&[
            IDENTIFIER_TAG.as_bytes(),
            config.output_fingerprint().as_bytes(),
            key.as_bytes(),
        ]);
        format!("{hash}.{ARTIFACT_EXT}")
    }
}
