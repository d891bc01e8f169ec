//! On-disk format for promoted compile results.
//!
//! Every promoted result is a single file named after its cache identifier.
//! The file starts with a bincode header carrying magic bytes, a format
//! version, and a checksum of the payload, followed by the compiled text.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use recomp_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a recomp cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"RCMP";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// File extension carried by every artifact produced by the default identifier.
pub const ARTIFACT_EXT: &str = "cache";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Header prepended to every cached artifact for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"RCMP"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Version of the crate that produced this artifact.
    pub recomp_version: String,

    /// Content hash of the payload text.
    pub checksum: ContentHash,
}

/// Encodes `text` as a complete artifact: header length, header, payload.
pub fn encode_artifact(text: &str) -> Result<Vec<u8>, CacheError> {
    let header = ArtifactHeader {
        magic: ARTIFACT_MAGIC,
        format_version: ARTIFACT_FORMAT_VERSION,
        recomp_version: env!("CARGO_PKG_VERSION").to_string(),
        checksum: ContentHash::from_bytes(text.as_bytes()),
    };

    let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + text.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(text.as_bytes());
    Ok(output)
}

/// Decodes and validates an artifact read from `path`.
pub fn decode_artifact(path: &Path, raw: &[u8]) -> Result<String, CacheError> {
    let invalid = |reason: &str| CacheError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if raw.len() < 4 {
        return Err(invalid("truncated header length"));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if raw.len() - 4 < header_len {
        return Err(invalid("truncated header"));
    }

    let (header, _): (ArtifactHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .map_err(|e| invalid(&e.to_string()))?;

    if header.magic != ARTIFACT_MAGIC {
        return Err(invalid("missing magic bytes"));
    }
    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            expected: ARTIFACT_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let payload = &raw[4 + header_len..];
    let actual = ContentHash::from_bytes(payload);
    if actual != header.checksum {
        return Err(CacheError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }

    String::from_utf8(payload.to_vec()).map_err(|_| CacheError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}

/// Writes `text` as an artifact at `path`, creating parent directories.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so concurrent readers only ever observe complete artifacts.
pub fn write_artifact_file(path: &Path, text: &str) -> Result<(), CacheError> {
    let io_err = |path: &Path, source: std::io::Error| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let bytes = encode_artifact(text)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Reads and validates the artifact at `path`.
pub fn read_artifact_file(path: &Path) -> Result<String, CacheError> {
    let raw = fs::read(path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_artifact(path, &raw)
}

/// Artifact storage rooted at one disk-cache directory.
///
/// Artifacts live at `<cache_dir>/<identifier>`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    cache_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a new artifact store rooted at the given cache directory.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the root directory of this store.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the file path for the artifact with the given identifier.
    pub fn artifact_path(&self, identifier: &str) -> PathBuf {
        self.cache_dir.join(identifier)
    }

    /// Writes `text` under `identifier`.
    pub fn write_text(&self, identifier: &str, text: &str) -> Result<PathBuf, CacheError> {
        let path = self.artifact_path(identifier);
        write_artifact_file(&path, text)?;
        Ok(path)
    }

    /// Reads the artifact stored under `identifier`.
    ///
    /// Returns `None` if the file doesn't exist or fails validation. A bad
    /// artifact is treated as a cache miss.
    pub fn read_text(&self, identifier: &str) -> Option<String> {
        let path = self.artifact_path(identifier);
        match read_artifact_file(&path) {
            Ok(text) => Some(text),
            Err(CacheError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                None
            }
            Err(err) => {
                tracing::debug!(
                    target: "recomp.cache",
                    path = %path.display(),
                    error = %err,
                    "ignoring unreadable cache artifact"
                );
                None
            }
        }
    }

    /// Loads every valid artifact in the store.
    ///
    /// Only files with the [`ARTIFACT_EXT`] extension are considered. Returns
    /// `(identifier, text)` pairs; a missing directory yields an empty list.
    pub fn load_all(&self) -> Result<Vec<(String, String)>, CacheError> {
        if !self.cache_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.cache_dir).map_err(|e| CacheError::Io {
            path: self.cache_dir.clone(),
            source: e,
        })?;

        let mut loaded = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: self.cache_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXT) {
                continue;
            }
            let Some(identifier) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(text) = self.read_text(identifier) {
                loaded.push((identifier.to_string(), text));
            }
        }
        loaded.sort();
        Ok(loaded)
    }
}
