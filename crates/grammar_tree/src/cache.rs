//! Prediction-context cache shared by every recognizer of a parse session.
//!
//! The engine memoizes structurally-equal parse contexts across parses, so a
//! long run over thousands of files grows the memo without bound unless
//! someone trims it. The cache is an explicit object owned by the session and
//! handed to each engine at construction.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// The `{size, clear}` capability the adapter needs from an engine's memo.
pub trait PredictionCache: Send + Sync {
    /// Number of memoized contexts.
    fn size(&self) -> usize;

    /// Drops every memoized context.
    fn clear(&self);

    /// Clears the cache when it holds more than `ceiling` entries.
    ///
    /// Returns true if the cache was cleared. Implementations shared between
    /// threads should perform the check and the clear under one lock.
    fn clear_if_larger_than(&self, ceiling: usize) -> bool {
        if self.size() > ceiling {
            self.clear();
            true
        } else {
            false
        }
    }
}

/// Cloneable handle to an interning set of prediction contexts.
///
/// Clones share the same storage.
pub struct SharedContextCache<C> {
    inner: Arc<Mutex<HashSet<Arc<C>>>>,
}

impl<C> Clone for SharedContextCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Eq + Hash> Default for SharedContextCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Eq + Hash> SharedContextCache<C> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns the canonical instance for `context`, storing it if unseen.
    pub fn intern(&self, context: C) -> Arc<C> {
        let mut set = self.inner.lock();
        if let Some(existing) = set.get(&context) {
            return Arc::clone(existing);
        }
        let context = Arc::new(context);
        set.insert(Arc::clone(&context));
        context
    }

    /// Returns true if a structurally-equal context is memoized.
    pub fn contains(&self, context: &C) -> bool {
        self.inner.lock().contains(context)
    }
}

impl<C: Eq + Hash + Send + Sync> PredictionCache for SharedContextCache<C> {
    fn size(&self) -> usize {
        self.inner.lock().len()
    }

    fn clear(&self) {
        self.inner.lock().clear();
    }

    fn clear_if_larger_than(&self, ceiling: usize) -> bool {
        let mut set = self.inner.lock();
        if set.len() > ceiling {
            set.clear();
            true
        } else {
            false
        }
    }
}

impl<C> fmt::Debug for SharedContextCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContextCache")
            .field("size", &self.inner.lock().len())
            .finish()
    }
}
