//! The compiler and parser seams the cache sits in front of.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use recomp_common::{CompileError, CompileErrorKind, CompileResult};

/// A replacement for the compiler's built-in parser.
pub trait Parser<Ast>: Send + Sync {
    /// Parses `source` into the compiler's syntax tree.
    fn parse(&self, source: &str) -> CompileResult<Ast>;
}

impl<Ast, F> Parser<Ast> for F
where
    F: Fn(&str) -> CompileResult<Ast> + Send + Sync,
{
    fn parse(&self, source: &str) -> CompileResult<Ast> {
        self(source)
    }
}

/// Options passed to [`Compiler::compile`].
pub struct CompileOptions<'a, Ast> {
    /// Process the input even if the compiler's heuristics would skip it.
    pub force: bool,
    /// Parser override, or `None` for the compiler's default parser.
    pub parser: Option<&'a dyn Parser<Ast>>,
}

impl<Ast> Default for CompileOptions<'_, Ast> {
    fn default() -> Self {
        Self {
            force: false,
            parser: None,
        }
    }
}

impl<Ast> fmt::Debug for CompileOptions<'_, Ast> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("force", &self.force)
            .field("parser", &self.parser.is_some())
            .finish()
    }
}

/// What the compiler produced for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// The transformed text.
    pub code: String,
    /// `true` when `code` equals the input byte for byte.
    pub identical: bool,
}

impl CompileOutput {
    /// Output that differs from the input.
    pub fn changed(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            identical: false,
        }
    }

    /// Output reporting that no transformation was necessary.
    pub fn identical(source: impl Into<String>) -> Self {
        Self {
            code: source.into(),
            identical: true,
        }
    }
}

/// A pure source-to-source transformer.
///
/// The output must depend only on the source text and the options: cached
/// results are served in place of later calls.
pub trait Compiler: Send + Sync {
    /// Syntax tree type produced by parser overrides.
    type Ast;

    /// Transforms `source`.
    fn compile(
        &self,
        source: &str,
        options: &CompileOptions<'_, Self::Ast>,
    ) -> CompileResult<CompileOutput>;
}

/// Named parser overrides that scope configuration can select.
pub struct ParserRegistry<Ast> {
    parsers: HashMap<String, Arc<dyn Parser<Ast>>>,
}

impl<Ast> Default for ParserRegistry<Ast> {
    fn default() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }
}

impl<Ast> fmt::Debug for ParserRegistry<Ast> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.parsers.keys().collect();
        names.sort();
        f.debug_struct("ParserRegistry")
            .field("parsers", &names)
            .finish()
    }
}

impl<Ast> ParserRegistry<Ast> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, parser: Arc<dyn Parser<Ast>>) -> &mut Self {
        self.parsers.insert(name.into(), parser);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, parser: Arc<dyn Parser<Ast>>) -> Self {
        self.register(name, parser);
        self
    }

    /// Looks up the parser registered under `name`.
    pub fn get(&self, name: &str) -> CompileResult<Arc<dyn Parser<Ast>>> {
        self.parsers.get(name).cloned().ok_or_else(|| {
            CompileError::new(
                CompileErrorKind::ParserNotFound,
                format!("cannot find parser '{name}'"),
            )
        })
    }

    /// Returns `true` if a parser is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(name)
    }

    /// Returns the number of registered parsers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Returns `true` if no parsers are registered.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_count(source: &str) -> CompileResult<usize> {
        Ok(source.split_whitespace().count())
    }

    #[test]
    fn registry_lookup() {
        let registry: ParserRegistry<usize> =
            ParserRegistry::new().with("words", Arc::new(word_count));
        assert!(registry.contains("words"));
        assert_eq!(registry.len(), 1);
        let parser = registry.get("words").unwrap();
        assert_eq!(parser.parse("let x = 1").unwrap(), 4);
    }

    #[test]
    fn missing_parser_is_parser_not_found() {
        let registry: ParserRegistry<usize> = ParserRegistry::new();
        let err = registry.get("acorn").err().unwrap();
        assert_eq!(err.kind, CompileErrorKind::ParserNotFound);
        assert!(err.message.contains("acorn"));
    }

    #[test]
    fn register_replaces() {
        let mut registry: ParserRegistry<usize> = ParserRegistry::new();
        registry.register("p", Arc::new(|_: &str| -> CompileResult<usize> { Ok(1) }));
        registry.register("p", Arc::new(|_: &str| -> CompileResult<usize> { Ok(2) }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("p").unwrap().parse("").unwrap(), 2);
    }

    #[test]
    fn options_default() {
        let options: CompileOptions<'_, usize> = CompileOptions::default();
        assert!(!options.force);
        assert!(options.parser.is_none());
        assert_eq!(
            format!("{options:?}"),
            "CompileOptions { force: false, parser: false }"
        );
    }

    #[test]
    fn output_constructors() {
        assert!(!CompileOutput::changed("var x").identical);
        let same = CompileOutput::identical("x");
        assert!(same.identical);
        assert_eq!(same.code, "x");
    }

    #[test]
    fn registry_debug_lists_names() {
        let registry: ParserRegistry<usize> = ParserRegistry::new()
            .with("b", Arc::new(word_count))
            .with("a", Arc::new(word_count));
        assert_eq!(
            format!("{registry:?}"),
            "ParserRegistry { parsers: [\"a\", \"b\"] }"
        );
    }
}
