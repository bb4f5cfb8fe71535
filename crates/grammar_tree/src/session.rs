//! A parse session owns the shared prediction-context cache and hands it to
//! every engine it creates.

use crate::adapter::BoundedParserAdapter;
use crate::builder::{BuildResult, ParseOutcome, ParseTreeBuilder};
use crate::cache::{PredictionCache, SharedContextCache};
use crate::engine::GrammarEngine;

/// Creates engines bound to a session's cache.
pub trait EngineFactory<C>: Send + Sync {
    type Engine: GrammarEngine;

    fn create(&self, cache: SharedContextCache<C>) -> Self::Engine;
}

impl<C, E, F> EngineFactory<C> for F
where
    F: Fn(SharedContextCache<C>) -> E + Send + Sync,
    E: GrammarEngine,
{
    type Engine = E;

    fn create(&self, cache: SharedContextCache<C>) -> E {
        self(cache)
    }
}

/// One cache, many engines.
///
/// Every engine is wrapped in a [`BoundedParserAdapter`] as it is created, so
/// the cache is checked against the builder's ceiling once per parse. The
/// check-and-clear runs under the cache's lock, which makes sessions safe to
/// share between worker threads.
#[derive(Debug)]
pub struct ParseSession<C, F> {
    cache: SharedContextCache<C>,
    factory: F,
    builder: ParseTreeBuilder,
}

impl<C, F> ParseSession<C, F>
where
    C: Eq + std::hash::Hash + Send + Sync,
    F: EngineFactory<C>,
{
    /// Creates a session with a fresh cache and a default builder.
    pub fn new(factory: F) -> Self {
        Self {
            cache: SharedContextCache::new(),
            factory,
            builder: ParseTreeBuilder::new(),
        }
    }

    /// Replaces the builder (root rule, cache ceiling).
    pub fn with_builder(mut self, builder: ParseTreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn cache(&self) -> &SharedContextCache<C> {
        &self.cache
    }

    pub fn builder(&self) -> &ParseTreeBuilder {
        &self.builder
    }

    /// Creates a fresh engine bound to this session's cache.
    pub fn adapter(&self) -> BoundedParserAdapter<F::Engine> {
        BoundedParserAdapter::with_ceiling(
            self.factory.create(self.cache.clone()),
            self.builder.ceiling(),
        )
    }

    /// Parses `source` with a fresh engine.
    pub fn parse(&self, source: &str) -> BuildResult<ParseOutcome> {
        let mut adapter = self.adapter();
        self.builder.build_with(&mut adapter, source)
    }

    /// Current number of memoized contexts.
    pub fn cache_size(&self) -> usize {
        self.cache.size()
    }
}
