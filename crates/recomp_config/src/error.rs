//! Failures reading a package's `recomp.toml`.

/// Why a package's cache settings could not be loaded.
///
/// A missing file surfaces as [`ConfigError::IoError`] with kind `NotFound`;
/// callers that treat an absent file as "use defaults" match on that.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or is absent.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML or names a key recomp does not know.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value parsed but is unusable, such as an empty parser name or a
    /// zero-length write queue.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_keeps_not_found_kind() {
        let err: ConfigError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "recomp.toml").into();
        assert!(matches!(
            &err,
            ConfigError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(err.to_string().starts_with("failed to read configuration:"));
    }

    #[test]
    fn unknown_key_message() {
        let err = ConfigError::ParseError("unknown field `parsr`".to_string());
        assert_eq!(
            err.to_string(),
            "failed to parse configuration: unknown field `parsr`"
        );
    }

    #[test]
    fn zero_queue_message() {
        let err = ConfigError::ValidationError(
            "writer.queue_capacity must be greater than zero".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "validation error: writer.queue_capacity must be greater than zero"
        );
    }
}
