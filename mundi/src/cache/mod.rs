//! Geometry-aware memoization.
//!
//! Two caches sit in front of expensive, region-parameterized computations:
//!
//! - [`FootprintCache`]: one result per entry, keyed by containment. A result
//!   is reused for any query region that lies inside the footprint the wrapped
//!   function reported for it.
//! - [`CoverageCache`]: accumulates collections of geometry-tagged items. A
//!   query is answered from prior entries where possible, and the wrapped
//!   function is only asked for the part of the region nothing covers yet.
//!
//! # Locking
//!
//! Each cache owns one `parking_lot::Mutex` around its entry list. Lookups
//! run under the lock; the wrapped function always runs without it, and the
//! result is inserted under a second, short lock. Two callers missing on the
//! same region at once will both call the wrapped function and both insert.
//! Their results are correct, just redundant.
//!
//! # Example
//!
//! ```
//! use mundi::cache::FootprintCache;
//! use mundi::geometry::{region_from_bbox, Region};
//!
//! // Reports a footprint four times the size of the query
//! let cache = FootprintCache::wrap(|region: Option<&Region>, _: &()| {
//!     Ok::<_, std::convert::Infallible>(region.map(|_| {
//!         ("zone-a", Some(region_from_bbox(-20.0, -20.0, 20.0, 20.0)))
//!     }))
//! });
//!
//! let first = cache.get(Some(&region_from_bbox(-10.0, -10.0, 10.0, 10.0)), &()).unwrap();
//! let second = cache.get(Some(&region_from_bbox(0.0, 0.0, 5.0, 5.0)), &()).unwrap();
//! assert_eq!(first, second);
//! assert_eq!(cache.stats().hits, 1);
//! ```

mod coverage;
mod footprint;

pub use coverage::{CoverageCache, CoverageEntry};
pub use footprint::{FootprintCache, FootprintEntry};

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Default number of entries kept by either cache.
pub const DEFAULT_MAXSIZE: usize = 128;

/// Point-in-time counters for a cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered without calling the wrapped function.
    pub hits: u64,
    /// Lookups that called the wrapped function.
    pub misses: u64,
    /// Calls passed straight through because they had nothing to key on.
    pub bypasses: u64,
    /// Entries currently held.
    pub entries: usize,
    /// Configured entry limit.
    pub maxsize: usize,
}

impl CacheStats {
    /// Fraction of keyed lookups that were hits, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits, {} misses, {} bypasses ({}/{} entries, {:.1}% hit rate)",
            self.hits,
            self.misses,
            self.bypasses,
            self.entries,
            self.maxsize,
            self.hit_rate() * 100.0
        )
    }
}

/// Clamp a requested entry limit to at least one entry.
pub(crate) fn effective_maxsize(maxsize: usize) -> usize {
    if maxsize == 0 {
        tracing::warn!("Cache maxsize of 0 requested, using 1");
        1
    } else {
        maxsize
    }
}

/// Remove repeated items from a coverage result, keeping first occurrences.
///
/// [`CoverageCache::get`] does not de-duplicate: an item near the shared
/// boundary of two cached entries can be returned once per entry. Callers
/// that can identify items apply this afterwards.
pub fn dedup_by_key<I, K, F>(items: Vec<I>, mut key: F) -> Vec<I>
where
    K: Eq + Hash,
    F: FnMut(&I) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            bypasses: 2,
            entries: 1,
            maxsize: 128,
        };
        let display = format!("{}", stats);
        assert!(display.contains("3 hits"));
        assert!(display.contains("1 misses"));
        assert!(display.contains("2 bypasses"));
        assert!(display.contains("1/128"));
        assert!(display.contains("75.0%"));
    }

    #[test]
    fn test_effective_maxsize() {
        assert_eq!(effective_maxsize(0), 1);
        assert_eq!(effective_maxsize(7), 7);
    }

    #[test]
    fn test_dedup_by_key_keeps_first_occurrence() {
        let items = vec![(1, "a"), (2, "b"), (1, "c"), (3, "d"), (2, "e")];
        let deduped = dedup_by_key(items, |(id, _)| *id);
        assert_eq!(deduped, vec![(1, "a"), (2, "b"), (3, "d")]);
    }
}
