//! Read-through compilation cache.
//!
//! This crate sits in front of a source-to-source [`Compiler`] and avoids
//! re-running it on input it has already processed. Results are kept per
//! package [`Scope`] in memory and, when a disk-cache directory is configured,
//! promoted to disk by a non-blocking [`WriteScheduler`] so later processes
//! start warm.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod invoker;
pub mod key;
pub mod request;
pub mod resolver;
pub mod scope;
pub mod store;
pub mod writer;

pub use artifact::{ArtifactStore, ARTIFACT_EXT};
pub use cache::CachingCompiler;
pub use compiler::{CompileOptions, CompileOutput, Compiler, Parser, ParserRegistry};
pub use error::CacheError;
pub use invoker::{CompileInvoker, DEFAULT_FORCED_EXTENSIONS};
pub use key::{CacheKey, HashedIdentifier, IdentifierDeriver};
pub use request::{CompileRequest, REPL_FILENAME};
pub use resolver::{ScopeRegistry, ScopeResolver};
pub use scope::Scope;
pub use store::{CacheStore, Promotion};
pub use writer::{BackgroundWriter, NoopWriter, WriteScheduler, WriterStats};

pub use recomp_common::{CompileError, CompileErrorKind, CompileResult, ContentHash};
pub use recomp_config::{CacheSettings, ScopeConfig, WriterConfig};
