//! Best-fit projection selection.
//!
//! For a query region the selector picks the catalog entry with the smallest
//! validity area that still wholly contains the region. Smaller validity
//! regions mean a more local projection and less distortion.
//!
//! Lookups go through one [`FootprintCache`] per axis unit. A selected
//! descriptor stays the answer for any region inside its validity region
//! that no smaller zone of the same unit reaches, so the cache footprint is
//! the validity region minus those smaller zones. The global fallback has no
//! footprint and is recomputed on each call.

use std::sync::Arc;

use super::{AxisUnit, CrsDescriptor, PcsError, ProjectionCatalog, ProjectionResult};
use crate::cache::{CacheStats, FootprintCache, DEFAULT_MAXSIZE};
use crate::geometry::{is_negligible, BBox, GeometryOps, Region};

/// Identifier of the fallback projection used in meters.
pub const GLOBAL_FALLBACK_CRS: &str = "ESRI:54009";

/// Name of the fallback projection used in meters.
pub const GLOBAL_FALLBACK_NAME: &str = "World Mollweide";

/// World Mollweide, used when no local meter-based projection fits.
pub fn global_fallback() -> CrsDescriptor {
    let world = BBox::new(-180.0, -90.0, 180.0, 90.0);
    CrsDescriptor {
        identifier: GLOBAL_FALLBACK_CRS.to_string(),
        name: GLOBAL_FALLBACK_NAME.to_string(),
        epsg: None,
        axis_unit: AxisUnit::Meters,
        validity_region: world.to_region(),
        validity_area: world.area(),
    }
}

type SelectionCache = FootprintCache<Arc<CrsDescriptor>, Region, AxisUnit, PcsError>;

/// Chooses projected coordinate systems from a catalog.
pub struct ProjectionSelector {
    catalog: Arc<dyn ProjectionCatalog>,
    fallback: Arc<CrsDescriptor>,
    meters: SelectionCache,
    feet: SelectionCache,
}

impl std::fmt::Debug for ProjectionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionSelector")
            .field("meters", &self.meters)
            .field("feet", &self.feet)
            .finish_non_exhaustive()
    }
}

impl ProjectionSelector {
    /// Create a selector with the default cache size.
    pub fn new(catalog: Arc<dyn ProjectionCatalog>) -> Self {
        Self::with_cache_size(catalog, DEFAULT_MAXSIZE)
    }

    /// Create a selector keeping up to `maxsize` footprints per axis unit.
    pub fn with_cache_size(catalog: Arc<dyn ProjectionCatalog>, maxsize: usize) -> Self {
        let fallback = Arc::new(global_fallback());
        Self {
            meters: Self::selection_cache(&catalog, &fallback, maxsize),
            feet: Self::selection_cache(&catalog, &fallback, maxsize),
            catalog,
            fallback,
        }
    }

    fn selection_cache(
        catalog: &Arc<dyn ProjectionCatalog>,
        fallback: &Arc<CrsDescriptor>,
        maxsize: usize,
    ) -> SelectionCache {
        let catalog = Arc::clone(catalog);
        let fallback = Arc::clone(fallback);
        FootprintCache::with_maxsize(
            move |region: Option<&Region>, unit: &AxisUnit| {
                let region = region.ok_or_else(|| {
                    PcsError::InvalidInput("projection lookup requires a region".to_string())
                })?;
                let result = choose(catalog.as_ref(), &fallback, region, *unit)?;
                let footprint = if result.is_global_fallback() {
                    None
                } else {
                    selection_footprint(catalog.as_ref(), &result.descriptor)
                };
                Ok(Some((result.descriptor, footprint)))
            },
            maxsize,
        )
    }

    /// Best-fit projection for `region` with axes in `unit`.
    ///
    /// # Errors
    ///
    /// - [`PcsError::InvalidInput`] if the region's bounding box has no area
    /// - [`PcsError::NoProjectionFound`] if no feet-based entry contains the
    ///   region (meters fall back to World Mollweide instead)
    pub fn select(&self, region: &Region, unit: AxisUnit) -> Result<ProjectionResult, PcsError> {
        validate_region(region)?;

        let cache = match unit {
            AxisUnit::Meters => &self.meters,
            AxisUnit::Feet => &self.feet,
        };

        let descriptor = cache
            .get(Some(region), &unit)?
            .ok_or(PcsError::NoProjectionFound { unit })?;

        tracing::debug!(crs = %descriptor.identifier, %unit, "Projection selected");
        if Arc::ptr_eq(&descriptor, &self.fallback) {
            Ok(ProjectionResult::global(descriptor))
        } else {
            Ok(ProjectionResult::local(descriptor))
        }
    }

    /// Uncached lookup returning the full [`ProjectionResult`].
    pub fn select_uncached(
        &self,
        region: &Region,
        unit: AxisUnit,
    ) -> Result<ProjectionResult, PcsError> {
        validate_region(region)?;
        choose(self.catalog.as_ref(), &self.fallback, region, unit)
    }

    /// Up to `n` projections containing `region`, smallest validity area
    /// first. Never falls back to the global projection.
    pub fn suggest(
        &self,
        region: &Region,
        unit: AxisUnit,
        n: usize,
    ) -> Result<Vec<Arc<CrsDescriptor>>, PcsError> {
        validate_region(region)?;
        let bbox = region_bounds(region)?;

        Ok(ranked_candidates(self.catalog.as_ref(), &bbox, unit)
            .into_iter()
            .filter(|descriptor| descriptor.validity_region.contains(region))
            .take(n)
            .collect())
    }

    /// Cache counters for `unit`.
    pub fn cache_stats(&self, unit: AxisUnit) -> CacheStats {
        match unit {
            AxisUnit::Meters => self.meters.stats(),
            AxisUnit::Feet => self.feet.stats(),
        }
    }

    /// Drop all cached footprints.
    pub fn clear_cache(&self) {
        self.meters.clear();
        self.feet.clear();
    }
}

fn validate_region(region: &Region) -> Result<(), PcsError> {
    let bbox = region_bounds(region)?;
    if bbox.is_degenerate() {
        return Err(PcsError::InvalidInput(format!(
            "region bounding box has no area: ({}, {}, {}, {})",
            bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
        )));
    }
    Ok(())
}

fn region_bounds(region: &Region) -> Result<BBox, PcsError> {
    region
        .bounds()
        .ok_or_else(|| PcsError::InvalidInput("region is empty".to_string()))
}

/// Catalog entries for `unit` overlapping `bbox`, smallest validity area first.
fn ranked_candidates(
    catalog: &dyn ProjectionCatalog,
    bbox: &BBox,
    unit: AxisUnit,
) -> Vec<Arc<CrsDescriptor>> {
    let mut candidates: Vec<_> = catalog
        .query(bbox)
        .into_iter()
        .filter(|descriptor| descriptor.axis_unit == unit)
        .collect();
    candidates.sort_by(|a, b| {
        a.validity_area
            .total_cmp(&b.validity_area)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    candidates
}

/// Where `descriptor` is still the tightest fit.
///
/// Removes every same-unit zone ranked ahead of `descriptor` from its
/// validity region. A region left inside the result cannot be contained by a
/// smaller zone. Returns `None` when nothing usable remains.
fn selection_footprint(
    catalog: &dyn ProjectionCatalog,
    descriptor: &CrsDescriptor,
) -> Option<Region> {
    let bbox = descriptor.validity_region.bounds()?;
    let mut footprint = descriptor.validity_region.clone();
    let mut carved = 0;

    for smaller in ranked_candidates(catalog, &bbox, descriptor.axis_unit) {
        if !ranks_before(&smaller, descriptor) {
            break;
        }
        if footprint.intersects(&smaller.validity_region) {
            footprint = footprint.difference(&smaller.validity_region);
            carved += 1;
        }
    }

    if footprint.is_empty() || is_negligible(footprint.area()) {
        tracing::trace!(crs = %descriptor.identifier, "Projection fully shadowed by smaller zones");
        return None;
    }
    tracing::trace!(crs = %descriptor.identifier, carved, "Selection footprint computed");
    Some(footprint)
}

/// Ordering used by [`ranked_candidates`]: smaller area, then identifier.
fn ranks_before(a: &CrsDescriptor, b: &CrsDescriptor) -> bool {
    a.validity_area
        .total_cmp(&b.validity_area)
        .then_with(|| a.identifier.cmp(&b.identifier))
        .is_lt()
}

/// Scan the catalog for the tightest containing projection.
fn choose(
    catalog: &dyn ProjectionCatalog,
    fallback: &Arc<CrsDescriptor>,
    region: &Region,
    unit: AxisUnit,
) -> Result<ProjectionResult, PcsError> {
    let bbox = region_bounds(region)?;
    let candidates = ranked_candidates(catalog, &bbox, unit);
    let scanned = candidates.len();

    if let Some(descriptor) = candidates
        .into_iter()
        .find(|descriptor| descriptor.validity_region.contains(region))
    {
        tracing::trace!(crs = %descriptor.identifier, scanned, "Catalog scan found projection");
        return Ok(ProjectionResult::local(descriptor));
    }

    match unit {
        AxisUnit::Meters => {
            tracing::debug!(scanned, "No local projection contains region, using global fallback");
            Ok(ProjectionResult::global(Arc::clone(fallback)))
        }
        AxisUnit::Feet => Err(PcsError::NoProjectionFound { unit }),
    }
}
