//! Running the compiler on a cache miss.

use std::path::Path;

use recomp_common::CompileResult;
use recomp_config::ScopeConfig;

use crate::compiler::{CompileOptions, CompileOutput, Compiler, ParserRegistry};

/// File extensions that are always compiled with `force` set.
pub const DEFAULT_FORCED_EXTENSIONS: &[&str] = &["mjs"];

/// Builds compiler options for an input and runs the compiler.
pub struct CompileInvoker<C: Compiler> {
    compiler: C,
    parsers: ParserRegistry<C::Ast>,
    forced_extensions: Vec<String>,
}

impl<C: Compiler> CompileInvoker<C> {
    /// Wraps `compiler` with no parser overrides and the default forced extensions.
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            parsers: ParserRegistry::new(),
            forced_extensions: DEFAULT_FORCED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Replaces the parser overrides available to scope configuration.
    pub fn set_parsers(&mut self, parsers: ParserRegistry<C::Ast>) {
        self.parsers = parsers;
    }

    /// Replaces the set of extensions (without the leading dot) that force compilation.
    pub fn set_forced_extensions(&mut self, extensions: Vec<String>) {
        self.forced_extensions = extensions;
    }

    /// Returns the wrapped compiler.
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Returns `true` when `filename` has one of the forced extensions.
    pub fn is_forced(&self, filename: Option<&Path>) -> bool {
        let Some(ext) = filename
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
        else {
            return false;
        };
        self.forced_extensions.iter().any(|forced| forced == ext)
    }

    /// Compiles `source` with options derived from `filename` and `config`.
    ///
    /// Fails with `ParserNotFound` before touching the compiler if `config`
    /// names a parser that is not registered.
    pub fn invoke(
        &self,
        source: &str,
        filename: Option<&Path>,
        config: &ScopeConfig,
    ) -> CompileResult<CompileOutput> {
        let parser = match config.parser.as_deref() {
            Some(name) => Some(self.parsers.get(name)?),
            None => None,
        };
        let options = CompileOptions {
            force: self.is_forced(filename),
            parser: parser.as_deref(),
        };
        self.compiler.compile(source, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use recomp_common::{CompileError, CompileErrorKind};
    use std::sync::Arc;

    /// Records the options of the last call and echoes the parser's output.
    #[derive(Default)]
    struct Recorder {
        last: Mutex<Option<(bool, Option<String>)>>,
    }

    impl Compiler for Recorder {
        type Ast = String;

        fn compile(
            &self,
            source: &str,
            options: &CompileOptions<'_, String>,
        ) -> CompileResult<CompileOutput> {
            let parsed = options.parser.map(|p| p.parse(source)).transpose()?;
            *self.last.lock() = Some((options.force, parsed));
            Ok(CompileOutput::changed(source.to_uppercase()))
        }
    }

    fn tag_ast(source: &str) -> CompileResult<String> {
        Ok(format!("ast:{source}"))
    }

    #[test]
    fn mjs_is_forced() {
        let invoker = CompileInvoker::new(Recorder::default());
        assert!(invoker.is_forced(Some(Path::new("src/a.mjs"))));
        assert!(!invoker.is_forced(Some(Path::new("src/a.js"))));
        assert!(!invoker.is_forced(Some(Path::new("src/Makefile"))));
        assert!(!invoker.is_forced(None));
    }

    #[test]
    fn forced_extensions_are_configurable() {
        let mut invoker = CompileInvoker::new(Recorder::default());
        invoker.set_forced_extensions(vec!["esm".to_string()]);
        assert!(invoker.is_forced(Some(Path::new("a.esm"))));
        assert!(!invoker.is_forced(Some(Path::new("a.mjs"))));
    }

    #[test]
    fn invoke_without_parser() {
        let invoker = CompileInvoker::new(Recorder::default());
        let out = invoker
            .invoke("let x", Some(Path::new("a.mjs")), &ScopeConfig::default())
            .unwrap();
        assert_eq!(out.code, "LET X");
        assert_eq!(*invoker.compiler().last.lock(), Some((true, None)));
    }

    #[test]
    fn invoke_passes_configured_parser() {
        let mut invoker = CompileInvoker::new(Recorder::default());
        let parsers: ParserRegistry<String> =
            ParserRegistry::new().with("tagged", Arc::new(tag_ast));
        invoker.set_parsers(parsers);
        let config = ScopeConfig {
            parser: Some("tagged".to_string()),
            ..ScopeConfig::default()
        };
        invoker.invoke("src", None, &config).unwrap();
        assert_eq!(
            *invoker.compiler().last.lock(),
            Some((false, Some("ast:src".to_string())))
        );
    }

    #[test]
    fn unknown_parser_skips_compiler() {
        let invoker = CompileInvoker::new(Recorder::default());
        let config = ScopeConfig {
            parser: Some("missing".to_string()),
            ..ScopeConfig::default()
        };
        let err: CompileError = invoker.invoke("src", None, &config).unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::ParserNotFound);
        assert!(invoker.compiler().last.lock().is_none());
    }
}
