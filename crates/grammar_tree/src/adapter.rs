//! Engine wrapper that keeps the shared prediction-context memo bounded.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::engine::GrammarEngine;

/// Largest number of memoized contexts tolerated before a reset.
pub const DEFAULT_CACHE_CEILING: usize = 10_000;

/// A grammar engine whose shared cache was checked against a ceiling when
/// the adapter was built.
///
/// When the cache holds more than `ceiling` entries, construction clears it,
/// resets the recognizer and drops its DFA. Growth is therefore bounded by the
/// ceiling plus whatever a single parse adds.
#[derive(Debug)]
pub struct BoundedParserAdapter<E> {
    engine: E,
    ceiling: usize,
    was_reset: bool,
}

impl<E: GrammarEngine> BoundedParserAdapter<E> {
    /// Wraps `engine` using [`DEFAULT_CACHE_CEILING`].
    pub fn new(engine: E) -> Self {
        Self::with_ceiling(engine, DEFAULT_CACHE_CEILING)
    }

    /// Wraps `engine`, trimming its shared cache if it exceeds `ceiling`.
    pub fn with_ceiling(mut engine: E, ceiling: usize) -> Self {
        let size = engine.shared_cache().size();
        let was_reset = engine.shared_cache().clear_if_larger_than(ceiling);
        if was_reset {
            engine.reset();
            engine.clear_dfa();
            debug!(size, ceiling, "cleared shared prediction-context cache");
        }
        Self {
            engine,
            ceiling,
            was_reset,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// True if construction had to clear the shared cache.
    pub fn was_reset(&self) -> bool {
        self.was_reset
    }

    pub fn into_inner(self) -> E {
        self.engine
    }
}

impl<E> Deref for BoundedParserAdapter<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}

impl<E> DerefMut for BoundedParserAdapter<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
