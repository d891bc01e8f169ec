//! Failures on the disk side of the cache.
//!
//! Nothing here reaches a caller of `CachingCompiler::compile`. Reads that
//! fail while warming a scope are skipped, and failed promotions are counted
//! and logged by the background writer.

use std::path::PathBuf;

/// Why an artifact could not be promoted to disk or loaded back.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The filesystem refused a read, write, rename, or directory listing.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// Artifact or cache directory being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is too short to hold a header, or the header does not decode
    /// to a recomp artifact.
    #[error("invalid artifact header in {path}: {reason}")]
    InvalidHeader {
        /// Artifact file.
        path: PathBuf,
        /// What was wrong with the header.
        reason: String,
    },

    /// The compiled text no longer hashes to the checksum recorded when it
    /// was promoted, typically after a partial or foreign write.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Artifact file.
        path: PathBuf,
        /// Hex checksum stored in the header.
        expected: String,
        /// Hex checksum of the payload as read.
        actual: String,
    },

    /// The artifact was written with a different on-disk layout.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Artifact file.
        path: PathBuf,
        /// Layout version this build reads.
        expected: u32,
        /// Layout version recorded in the file.
        actual: u32,
    },

    /// The checksum matched but the payload is not compiled text.
    #[error("artifact payload in {path} is not valid UTF-8")]
    InvalidUtf8 {
        /// Artifact file.
        path: PathBuf,
    },

    /// The artifact header could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Encoder message.
        reason: String,
    },
}
