//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::CacheSettings;
use std::path::Path;

/// Name of the configuration file looked up in a package root.
pub const CONFIG_FILE: &str = "recomp.toml";

/// Loads and validates a `recomp.toml` configuration from a package directory.
///
/// Reads `<package_dir>/recomp.toml`, parses it, and validates its values.
pub fn load_config(package_dir: &Path) -> Result<CacheSettings, ConfigError> {
    let config_path = package_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `recomp.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<CacheSettings, ConfigError> {
    let config: CacheSettings =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &CacheSettings) -> Result<(), ConfigError> {
    if matches!(config.cache.parser.as_deref(), Some(p) if p.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "cache.parser must not be empty".to_string(),
        ));
    }
    if matches!(&config.cache.cache_path, Some(p) if p.as_os_str().is_empty()) {
        return Err(ConfigError::ValidationError(
            "cache.cache_path must not be empty".to_string(),
        ));
    }
    if config.writer.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "writer.queue_capacity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
