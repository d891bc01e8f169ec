//! High-level cache orchestrator.
//!
//! [`CachingCompiler`] is the read-through entry point. It resolves the scope
//! for an input, derives the cache identifier, serves in-memory hits without
//! any I/O, and on a miss runs the compiler, records the result, and hands it
//! to the write scheduler for promotion to disk.

use std::path::Path;
use std::sync::Arc;

use recomp_common::CompileResult;

use crate::compiler::{Compiler, ParserRegistry};
use crate::invoker::CompileInvoker;
use crate::key::{CacheKey, HashedIdentifier, IdentifierDeriver};
use crate::request::CompileRequest;
use crate::resolver::ScopeResolver;
use crate::scope::Scope;
use crate::store::CacheStore;
use crate::writer::WriteScheduler;

/// A compiler wrapped in a persistent, package-scoped result cache.
///
/// Safe to share across threads when the compiler is. Concurrent misses on
/// the same identifier may both compile; the first stored result wins.
pub struct CachingCompiler<C: Compiler> {
    invoker: CompileInvoker<C>,
    resolver: Arc<dyn ScopeResolver>,
    writer: Arc<dyn WriteScheduler>,
    deriver: Arc<dyn IdentifierDeriver>,
    /// Shared by every call that has no filename.
    fallback: Arc<Scope>,
}

impl<C: Compiler> CachingCompiler<C> {
    /// Wraps `compiler`, resolving scopes with `resolver` and promoting
    /// results through `writer`.
    pub fn new(
        compiler: C,
        resolver: Arc<dyn ScopeResolver>,
        writer: Arc<dyn WriteScheduler>,
    ) -> Self {
        Self {
            invoker: CompileInvoker::new(compiler),
            resolver,
            writer,
            deriver: Arc::new(HashedIdentifier),
            fallback: Arc::new(Scope::fallback()),
        }
    }

    /// Sets the parser overrides that scope configuration may name.
    pub fn with_parsers(mut self, parsers: ParserRegistry<C::Ast>) -> Self {
        self.invoker.set_parsers(parsers);
        self
    }

    /// Replaces the identifier derivation.
    pub fn with_deriver(mut self, deriver: Arc<dyn IdentifierDeriver>) -> Self {
        self.deriver = deriver;
        self
    }

    /// Replaces the extensions that force compilation (default: `mjs`).
    pub fn with_forced_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invoker
            .set_forced_extensions(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the in-memory scope used for input without a filename.
    pub fn fallback_scope(&self) -> &Arc<Scope> {
        &self.fallback
    }

    /// Returns the wrapped compiler.
    pub fn compiler(&self) -> &C {
        self.invoker.compiler()
    }

    /// Compiles `source`, serving a cached result when one exists.
    ///
    /// Returns `source` unchanged when the resolver disables caching for the
    /// input's directory. Compiler failures for a named file have the
    /// filename appended to their message; their kind is preserved.
    pub fn compile(&self, source: &str, request: &CompileRequest) -> CompileResult<Arc<str>> {
        let filename = request.filename();

        let Some(filename) = filename else {
            return self.compile_with_cache(&self.fallback, source, request.cache_key(), None);
        };

        let dir = filename.parent().unwrap_or_else(|| Path::new(""));
        let Some(scope) = self.resolver.resolve(dir) else {
            tracing::debug!(
                target: "recomp.cache",
                file = %filename.display(),
                "no scope for file; passing source through"
            );
            return Ok(Arc::from(source));
        };

        self.compile_with_cache(&scope, source, request.cache_key(), Some(filename))
            .map_err(|err| err.with_filename(filename))
    }

    fn compile_with_cache(
        &self,
        scope: &Scope,
        source: &str,
        cache_key: &CacheKey,
        filename: Option<&Path>,
    ) -> CompileResult<Arc<str>> {
        let key = cache_key.resolve(source);
        let identifier = self.deriver.derive(&key, scope.config());

        if let Some(hit) = CacheStore::lookup(scope, &identifier) {
            tracing::debug!(target: "recomp.cache", %identifier, "cache hit");
            return Ok(hit);
        }

        let output = self.invoker.invoke(source, filename, scope.config())?;
        if output.identical {
            tracing::debug!(
                target: "recomp.cache",
                %identifier,
                "compiler made no changes; not caching"
            );
            return Ok(Arc::from(source));
        }

        let code = CacheStore::store(scope, identifier.clone(), output.code);
        tracing::debug!(target: "recomp.cache", %identifier, "cache miss; stored result");

        if let Some(promotion) = CacheStore::promotion(scope, filename, &identifier) {
            self.writer.schedule_write(
                &promotion.base_dir,
                &promotion.relative_path,
                Arc::clone(&code),
            );
        }

        Ok(code)
    }
}
