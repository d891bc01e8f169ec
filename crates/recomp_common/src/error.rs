//! Errors reported by compilers running behind the cache.

use std::fmt;
use std::path::Path;

/// Result type for operations that run (or may run) the compiler.
pub type CompileResult<T> = Result<T, CompileError>;

/// Classification of a compile failure.
///
/// The kind survives every layer of the cache unchanged; only the message is
/// ever extended with context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
    /// The input could not be parsed.
    Syntax,
    /// The input uses a construct the compiler cannot transform.
    Unsupported,
    /// The configured parser override is not registered.
    ParserNotFound,
    /// A bug inside the compiler rather than a problem with the input.
    Internal,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Syntax => "syntax error",
            Self::Unsupported => "unsupported input",
            Self::ParserNotFound => "parser not found",
            Self::Internal => "internal compiler error",
        };
        f.write_str(name)
    }
}

/// A failure raised by the compiler (or while preparing to call it).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    /// What kind of failure this is.
    pub kind: CompileErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl CompileError {
    /// Creates a new error of the given kind.
    pub fn new(kind: CompileErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a [`CompileErrorKind::Syntax`] error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Syntax, message)
    }

    /// Shorthand for a [`CompileErrorKind::Internal`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Internal, message)
    }

    /// Appends the file being processed to the message, keeping the kind.
    pub fn with_filename(mut self, filename: &Path) -> Self {
        self.message
            .push_str(&format!(" while processing file: {}", filename.display()));
        self
    }
}

impl From<String> for CompileError {
    fn from(message: String) -> Self {
        Self::internal(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_message() {
        let err = CompileError::syntax("bad syntax");
        assert_eq!(format!("{err}"), "bad syntax");
    }

    #[test]
    fn with_filename_appends_and_keeps_kind() {
        let err = CompileError::syntax("bad syntax").with_filename(Path::new("src/a.js"));
        assert_eq!(err.kind, CompileErrorKind::Syntax);
        assert_eq!(err.message, "bad syntax while processing file: src/a.js");
    }

    #[test]
    fn ok_path() {
        let r: CompileResult<i32> = Ok(42);
        assert_eq!(r.ok(), Some(42));
    }

    #[test]
    fn from_string_is_internal() {
        let err: CompileError = "from string".to_string().into();
        assert_eq!(err.kind, CompileErrorKind::Internal);
        assert_eq!(err.message, "from string");
    }

    #[test]
    fn kind_display() {
        assert_eq!(CompileErrorKind::ParserNotFound.to_string(), "parser not found");
        assert_eq!(CompileErrorKind::Internal.to_string(), "internal compiler error");
    }
}
