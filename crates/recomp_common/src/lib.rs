//! Shared foundational types used across the recomp compilation cache.
//!
//! This crate provides the content hash used to derive cache identifiers and
//! the error type reported by compilers sitting behind the cache.

#![warn(missing_docs)]

pub mod error;
pub mod hash;

pub use error::{CompileError, CompileErrorKind, CompileResult};
pub use hash::ContentHash;
