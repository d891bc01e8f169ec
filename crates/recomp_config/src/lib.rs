//! Parsing and validation of `recomp.toml` package cache configuration.
//!
//! A package root may carry a `recomp.toml` that selects a parser override,
//! a disk-cache directory, and tuning for the background writer. This crate
//! turns it into a strongly-typed [`CacheSettings`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::resolve_cache_root;
pub use types::*;
