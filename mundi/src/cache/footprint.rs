//! Containment-keyed memoization.
//!
//! The wrapped function returns its result together with a *footprint*: the
//! region over which that result stays correct. Any later query region that
//! lies inside a cached footprint is answered from the cache.
//!
//! Entries are kept newest-first and the list is truncated to `maxsize` on
//! insert. Hits do not reorder entries, so eviction follows insertion order
//! rather than access order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{effective_maxsize, CacheStats, DEFAULT_MAXSIZE};
use crate::geometry::GeometryOps;

/// Signature of a function wrapped by [`FootprintCache`].
///
/// Returns `Ok(None)` when there is no result, or `Ok(Some((result, footprint)))`.
/// A `None` footprint marks the result as valid but not cacheable.
type FootprintFn<T, G, A, E> =
    dyn Fn(Option<&G>, &A) -> Result<Option<(T, Option<G>)>, E> + Send + Sync;

/// A cached result and the region it is valid for.
#[derive(Debug, Clone)]
pub struct FootprintEntry<T, G> {
    pub result: T,
    pub footprint: G,
}

/// Memoizes a region-parameterized function by footprint containment.
///
/// `A` carries any extra arguments the wrapped function takes; they are
/// passed through but are not part of the cache key. Callers that need the
/// extra arguments to influence the key keep one cache per argument value.
pub struct FootprintCache<T, G, A = (), E = std::convert::Infallible> {
    func: Box<FootprintFn<T, G, A, E>>,
    entries: Mutex<VecDeque<FootprintEntry<T, G>>>,
    maxsize: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
}

impl<T, G, A, E> fmt::Debug for FootprintCache<T, G, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FootprintCache")
            .field("maxsize", &self.maxsize)
            .field("entries", &self.entries.lock().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T, G, A, E> FootprintCache<T, G, A, E>
where
    T: Clone,
    G: GeometryOps,
{
    /// Wrap `func` with the default entry limit.
    pub fn wrap<F>(func: F) -> Self
    where
        F: Fn(Option<&G>, &A) -> Result<Option<(T, Option<G>)>, E> + Send + Sync + 'static,
    {
        Self::with_maxsize(func, DEFAULT_MAXSIZE)
    }

    /// Wrap `func`, keeping at most `maxsize` entries.
    pub fn with_maxsize<F>(func: F, maxsize: usize) -> Self
    where
        F: Fn(Option<&G>, &A) -> Result<Option<(T, Option<G>)>, E> + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
            entries: Mutex::new(VecDeque::new()),
            maxsize: effective_maxsize(maxsize),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypasses: AtomicU64::new(0),
        }
    }

    /// Look up `region`, calling the wrapped function on a miss.
    ///
    /// A `None` region has no footprint to key on and always goes straight to
    /// the wrapped function. Errors from the wrapped function are returned
    /// unchanged and leave the cache untouched.
    pub fn get(&self, region: Option<&G>, extra: &A) -> Result<Option<T>, E> {
        let Some(region) = region else {
            self.bypasses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Footprint cache bypassed, no region given");
            return Ok((self.func)(None, extra)?.map(|(result, _)| result));
        };

        if let Some(result) = self.lookup(region) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(result));
        }

        // Run unlocked; a concurrent miss on the same region is allowed
        let output = (self.func)(Some(region), extra)?;
        self.misses.fetch_add(1, Ordering::Relaxed);

        let Some((result, footprint)) = output else {
            tracing::trace!("Footprint cache miss returned no result");
            return Ok(None);
        };

        match footprint {
            Some(footprint) => self.insert(result.clone(), footprint),
            None => tracing::trace!("Result has no footprint, not caching"),
        }

        Ok(Some(result))
    }

    /// First cached result whose footprint contains `region`.
    fn lookup(&self, region: &G) -> Option<T> {
        let entries = self.entries.lock();
        entries
            .iter()
            .find(|entry| entry.footprint.contains(region))
            .map(|entry| entry.result.clone())
    }

    fn insert(&self, result: T, footprint: G) {
        let mut entries = self.entries.lock();
        entries.push_front(FootprintEntry { result, footprint });
        entries.truncate(self.maxsize);
        tracing::debug!(
            entries = entries.len(),
            maxsize = self.maxsize,
            "Footprint cache entry added"
        );
    }
}

impl<T, G, A, E> FootprintCache<T, G, A, E>
where
    G: Clone,
{
    /// Cached footprints, newest first.
    pub fn footprints(&self) -> Vec<G> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.footprint.clone())
            .collect()
    }
}

impl<T, G, A, E> FootprintCache<T, G, A, E> {
    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Configured entry limit.
    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    /// Drop all entries. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            entries: self.len(),
            maxsize: self.maxsize,
        }
    }
}
