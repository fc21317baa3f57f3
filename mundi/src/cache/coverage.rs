//! Set-difference memoization for region queries that return many items.
//!
//! Each entry records the exact region handed to the wrapped source and the
//! items it returned. A new query is first answered from overlapping entries,
//! largest region first; each entry used is subtracted from the outstanding
//! region. Only what is left over goes to the source, and that remainder
//! (not the full query) becomes the new entry.
//!
//! ```text
//!  query R ──► entries (area desc) ──► collected items
//!                   │                       ▲
//!                   ▼                       │
//!            remaining = R − Σ entries ──► source(remaining) ──► new entry
//! ```
//!
//! The result is not de-duplicated. An item straddling the boundary of two
//! entries is returned once per entry; see [`super::dedup_by_key`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use geo::Intersects;
use parking_lot::Mutex;

use super::{effective_maxsize, CacheStats, DEFAULT_MAXSIZE};
use crate::config::CacheSettings;
use crate::geometry::{is_negligible, GeometryOps, HasGeometry};

/// Signature of a source wrapped by [`CoverageCache`].
type CoverageFn<I, G, E> = dyn Fn(&G, &str) -> Result<Vec<I>, E> + Send + Sync;

/// Items fetched for one exact region.
#[derive(Debug, Clone)]
pub struct CoverageEntry<I, G> {
    /// The region passed to the source, unmodified.
    pub region: G,
    /// Partition key (projection, unit system, layer...).
    pub unit_key: String,
    pub items: Vec<I>,
    area: f64,
}

impl<I, G: GeometryOps> CoverageEntry<I, G> {
    fn new(region: G, unit_key: &str, items: Vec<I>) -> Self {
        let area = region.area();
        Self {
            region,
            unit_key: unit_key.to_string(),
            items,
            area,
        }
    }

    /// Area of `region`, computed once at insert.
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Result of scanning the cached entries for a query.
struct CachedPart<I, G> {
    collected: Vec<Vec<I>>,
    remaining: G,
    entries_used: usize,
}

/// Memoizes a region-to-items source by partial reuse of earlier queries.
pub struct CoverageCache<I, G, E = std::convert::Infallible> {
    func: Box<CoverageFn<I, G, E>>,
    entries: Mutex<Vec<CoverageEntry<I, G>>>,
    maxsize: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
}

impl<I, G, E> fmt::Debug for CoverageCache<I, G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageCache")
            .field("maxsize", &self.maxsize)
            .field("entries", &self.entries.lock().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<I, G, E> CoverageCache<I, G, E>
where
    I: Clone + HasGeometry,
    I::Geometry: Intersects<G>,
    G: GeometryOps,
{
    /// Wrap `func` with the default entry limit.
    pub fn wrap<F>(func: F) -> Self
    where
        F: Fn(&G, &str) -> Result<Vec<I>, E> + Send + Sync + 'static,
    {
        Self::with_maxsize(func, DEFAULT_MAXSIZE)
    }

    /// Wrap `func`, keeping at most `maxsize` entries.
    pub fn with_maxsize<F>(func: F, maxsize: usize) -> Self
    where
        F: Fn(&G, &str) -> Result<Vec<I>, E> + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
            entries: Mutex::new(Vec::new()),
            maxsize: effective_maxsize(maxsize),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypasses: AtomicU64::new(0),
        }
    }

    /// Wrap `func` with the entry limit from the `[cache]` config section.
    pub fn from_settings<F>(func: F, settings: &CacheSettings) -> Self
    where
        F: Fn(&G, &str) -> Result<Vec<I>, E> + Send + Sync + 'static,
    {
        Self::with_maxsize(func, settings.coverage_maxsize)
    }

    /// Items for `region` under `unit_key`.
    ///
    /// Empty or zero-area regions return no items and touch neither the
    /// cache nor the source. Source errors are returned unchanged and nothing
    /// is inserted.
    pub fn get(&self, region: &G, unit_key: &str) -> Result<Vec<I>, E> {
        if region.is_empty() || is_negligible(region.area()) {
            self.bypasses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(unit_key, "Coverage cache skipped empty region");
            return Ok(Vec::new());
        }

        let CachedPart {
            mut collected,
            remaining,
            entries_used,
        } = self.collect_cached(region, unit_key);

        let remaining_area = remaining.area();
        if is_negligible(remaining_area) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(unit_key, entries_used, "Coverage cache fully covered query");
            return Ok(collected.into_iter().flatten().collect());
        }

        tracing::debug!(
            unit_key,
            entries_used,
            remaining_area,
            query_area = region.area(),
            "Coverage cache fetching uncovered remainder"
        );

        // Run unlocked; concurrent callers may fetch the same remainder
        let fetched = (self.func)(&remaining, unit_key)?;
        self.misses.fetch_add(1, Ordering::Relaxed);

        self.insert(CoverageEntry::new(remaining, unit_key, fetched.clone()));
        collected.push(fetched);

        Ok(collected.into_iter().flatten().collect())
    }

    /// Take what the cache already holds for `region`.
    fn collect_cached(&self, region: &G, unit_key: &str) -> CachedPart<I, G> {
        let entries = self.entries.lock();

        let mut remaining = region.clone();
        let mut collected = Vec::new();
        let mut entries_used = 0;

        // List order is area-descending, so the largest prior fetch goes first
        let candidates = entries
            .iter()
            .filter(|entry| {
                entry.unit_key == unit_key && GeometryOps::intersects(&entry.region, region)
            });

        for entry in candidates {
            if remaining.contains(&entry.region) {
                collected.push(entry.items.clone());
            } else {
                let overlap = entry.region.intersection(&remaining);
                if is_negligible(overlap.area()) {
                    continue;
                }
                collected.push(
                    entry
                        .items
                        .iter()
                        .filter(|item| Intersects::intersects(item.geometry(), &overlap))
                        .cloned()
                        .collect(),
                );
            }
            entries_used += 1;

            remaining = remaining.difference(&entry.region);
            if is_negligible(remaining.area()) {
                break;
            }
        }

        CachedPart {
            collected,
            remaining,
            entries_used,
        }
    }

    fn insert(&self, entry: CoverageEntry<I, G>) {
        let mut entries = self.entries.lock();
        // Newest first among equal areas; the sort below is stable
        entries.insert(0, entry);
        entries.sort_by(|a, b| b.area.total_cmp(&a.area));
        entries.truncate(self.maxsize);
        tracing::debug!(
            entries = entries.len(),
            maxsize = self.maxsize,
            "Coverage cache entry added"
        );
    }
}

impl<I, G, E> CoverageCache<I, G, E>
where
    G: Clone,
{
    /// Cached regions with their unit keys, largest first.
    pub fn regions(&self) -> Vec<(G, String)> {
        self.entries
            .lock()
            .iter()
            .map(|entry| (entry.region.clone(), entry.unit_key.clone()))
            .collect()
    }
}

impl<I, G, E> CoverageCache<I, G, E> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{region_from_bbox, Region};
    use geo::Point;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// One point at the centre of every unit cell inside `region`.
    fn grid_points(region: &Region) -> Vec<Point<f64>> {
        let Some(b) = region.bounds() else {
            return Vec::new();
        };
        let mut points = Vec::new();
        let mut x = b.min_x.floor() + 0.5;
        while x < b.max_x {
            let mut y = b.min_y.floor() + 0.5;
            while y < b.max_y {
                let point = Point::new(x, y);
                if geo::Contains::contains(region, &point) {
                    points.push(point);
                }
                y += 1.0;
            }
            x += 1.0;
        }
        points
    }

    fn grid_cache(calls: Arc<AtomicUsize>, maxsize: usize) -> CoverageCache<Point<f64>, Region> {
        CoverageCache::with_maxsize(
            move |region: &Region, _: &str| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(grid_points(region))
            },
            maxsize,
        )
    }

    #[test]
    fn test_from_settings_uses_coverage_maxsize() {
        let settings = CacheSettings {
            footprint_maxsize: 7,
            coverage_maxsize: 2,
        };
        let cache: CoverageCache<Point<f64>, Region> = CoverageCache::from_settings(
            |region: &Region, _: &str| Ok(grid_points(region)),
            &settings,
        );
        assert_eq!(cache.maxsize(), 2);

        for offset in [0.0, 10.0, 20.0] {
            cache
                .get(&region_from_bbox(offset, 0.0, offset + 2.0, 2.0), "meters")
                .unwrap();
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_nested_query_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls.clone(), 128);

        let big = cache
            .get(&region_from_bbox(-20.0, -20.0, 20.0, 20.0), "meters")
            .unwrap();
        assert_eq!(big.len(), 1600);

        let small_region = region_from_bbox(-10.0, -10.0, 10.0, 10.0);
        let small = cache.get(&small_region, "meters").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(small.len(), 400);
        assert!(small
            .iter()
            .all(|p| geo::Contains::contains(&small_region, p)));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_repeat_query_makes_no_source_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls.clone(), 128);
        let region = region_from_bbox(3.0, 4.0, 9.0, 7.0);

        let first = cache.get(&region, "meters").unwrap();
        let second = cache.get(&region, "meters").unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disjoint_queries_create_separate_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls.clone(), 128);

        let a = region_from_bbox(0.0, 0.0, 5.0, 5.0);
        let b = region_from_bbox(100.0, 100.0, 102.0, 102.0);
        assert_eq!(cache.get(&a, "meters").unwrap().len(), 25);
        assert_eq!(cache.get(&b, "meters").unwrap().len(), 4);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let regions = cache.regions();
        assert_eq!(regions.len(), 2);
        assert!(!regions[0].0.contains(&regions[1].0));
        assert!(!regions[1].0.contains(&regions[0].0));
    }

    #[test]
    fn test_partial_overlap_fetches_only_remainder() {
        let seen = Arc::new(Mutex::new(Vec::<f64>::new()));
        let recorder = Arc::clone(&seen);
        let cache: CoverageCache<Point<f64>, Region> =
            CoverageCache::wrap(move |region: &Region, _: &str| {
                recorder.lock().push(region.area());
                Ok(grid_points(region))
            });

        cache
            .get(&region_from_bbox(0.0, 0.0, 10.0, 10.0), "meters")
            .unwrap();
        let items = cache
            .get(&region_from_bbox(5.0, 0.0, 15.0, 10.0), "meters")
            .unwrap();

        assert_eq!(items.len(), 100);
        let areas = seen.lock().clone();
        assert_eq!(areas.len(), 2);
        assert!((areas[1] - 50.0).abs() < 1e-6, "only the uncovered half is fetched");
    }

    #[test]
    fn test_stored_region_is_the_fetched_remainder() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls, 128);

        cache
            .get(&region_from_bbox(0.0, 0.0, 10.0, 10.0), "meters")
            .unwrap();
        cache
            .get(&region_from_bbox(0.0, 0.0, 20.0, 10.0), "meters")
            .unwrap();

        let regions = cache.regions();
        assert_eq!(regions.len(), 2);
        let expected = region_from_bbox(10.0, 0.0, 20.0, 10.0);
        let stored = regions
            .iter()
            .map(|(region, _)| region)
            .find(|region| !region.contains(&region_from_bbox(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        assert!(is_negligible(stored.difference(&expected).area()));
        assert!(is_negligible(expected.difference(stored).area()));
    }

    #[test]
    fn test_unit_keys_are_isolated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls.clone(), 128);
        let region = region_from_bbox(0.0, 0.0, 4.0, 4.0);

        cache.get(&region, "meters").unwrap();
        cache.get(&region, "feet").unwrap();
        cache.get(&region, "feet").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_empty_region_skips_source() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls.clone(), 128);

        let flat = region_from_bbox(0.0, 0.0, 10.0, 0.0);
        assert!(cache.get(&flat, "meters").unwrap().is_empty());
        assert!(cache.get(&Region::new(vec![]), "meters").unwrap().is_empty());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().bypasses, 2);
    }

    #[test]
    fn test_source_error_leaves_cache_unchanged() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let switch = Arc::clone(&fail);
        let cache: CoverageCache<Point<f64>, Region, String> =
            CoverageCache::wrap(move |region: &Region, _: &str| {
                if switch.load(Ordering::SeqCst) {
                    Err("source offline".to_string())
                } else {
                    Ok(grid_points(region))
                }
            });

        cache
            .get(&region_from_bbox(0.0, 0.0, 2.0, 2.0), "meters")
            .unwrap();
        let before = cache.stats();

        fail.store(true, Ordering::SeqCst);
        let err = cache
            .get(&region_from_bbox(5.0, 5.0, 6.0, 6.0), "meters")
            .unwrap_err();

        assert_eq!(err, "source offline");
        assert_eq!(cache.stats(), before);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_sorted_by_area_and_truncated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = grid_cache(calls, 2);

        cache
            .get(&region_from_bbox(0.0, 0.0, 2.0, 2.0), "meters")
            .unwrap();
        cache
            .get(&region_from_bbox(10.0, 10.0, 20.0, 20.0), "meters")
            .unwrap();
        cache
            .get(&region_from_bbox(50.0, 50.0, 55.0, 55.0), "meters")
            .unwrap();

        let areas: Vec<f64> = cache.regions().iter().map(|(r, _)| r.area()).collect();
        assert_eq!(areas.len(), 2);
        assert!((areas[0] - 100.0).abs() < 1e-9);
        assert!((areas[1] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_items_may_repeat() {
        // A polygon item straddling the seam between two cached entries
        let seam = geo::Geometry::Polygon(geo::Polygon::new(
            geo::LineString::from(vec![(9.0, 4.0), (11.0, 4.0), (11.0, 6.0), (9.0, 6.0)]),
            vec![],
        ));
        let item = seam.clone();
        let cache: CoverageCache<geo::Geometry<f64>, Region> =
            CoverageCache::wrap(move |region: &Region, _: &str| {
                Ok(if Intersects::intersects(&item, region) {
                    vec![item.clone()]
                } else {
                    vec![]
                })
            });

        cache
            .get(&region_from_bbox(0.0, 0.0, 10.0, 10.0), "meters")
            .unwrap();
        cache
            .get(&region_from_bbox(10.0, 0.0, 20.0, 10.0), "meters")
            .unwrap();
        let items = cache
            .get(&region_from_bbox(0.0, 0.0, 20.0, 10.0), "meters")
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], seam);
    }

    #[test]
    fn test_concurrent_callers_get_complete_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(grid_cache(calls, 64));

        std::thread::scope(|scope| {
            for i in 0..6 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    let offset = f64::from(i) * 3.0;
                    let region = region_from_bbox(offset, 0.0, offset + 10.0, 10.0);
                    let items = cache.get(&region, "meters").unwrap();
                    let unique = crate::cache::dedup_by_key(items, |p| {
                        (p.x().to_bits(), p.y().to_bits())
                    });
                    assert_eq!(unique.len(), 100);
                });
            }
        });

        assert!(cache.len() <= 64);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn integer_box() -> impl Strategy<Value = (i32, i32, i32, i32)> {
            (-30i32..30, -30i32..30, 1i32..15, 1i32..15)
        }

        proptest! {
            #[test]
            fn test_results_match_uncached_source(
                queries in proptest::collection::vec(integer_box(), 1..8),
                maxsize in 1usize..6,
            ) {
                let calls = Arc::new(AtomicUsize::new(0));
                let cache = grid_cache(calls, maxsize);

                for (x, y, w, h) in queries {
                    let region = region_from_bbox(
                        f64::from(x),
                        f64::from(y),
                        f64::from(x + w),
                        f64::from(y + h),
                    );
                    let items = cache.get(&region, "meters").unwrap();
                    let unique = crate::cache::dedup_by_key(items, |p| {
                        (p.x().to_bits(), p.y().to_bits())
                    });

                    prop_assert_eq!(unique.len(), grid_points(&region).len());
                    prop_assert!(cache.len() <= maxsize);
                }
            }

            #[test]
            fn test_second_identical_query_is_free(query in integer_box()) {
                let calls = Arc::new(AtomicUsize::new(0));
                let cache = grid_cache(calls.clone(), 8);
                let (x, y, w, h) = query;
                let region = region_from_bbox(
                    f64::from(x),
                    f64::from(y),
                    f64::from(x + w),
                    f64::from(y + h),
                );

                cache.get(&region, "meters").unwrap();
                let after_first = calls.load(Ordering::SeqCst);
                cache.get(&region, "meters").unwrap();

                prop_assert_eq!(calls.load(Ordering::SeqCst), after_first);
            }
        }
    }
}
