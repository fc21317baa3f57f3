//! Geometry binding for the spatial caches.
//!
//! The caches never touch coordinates directly. They only need a handful of
//! pure operations (area, bounds, containment, overlay), which are captured by
//! the [`GeometryOps`] trait. The concrete engine is the `geo` crate, and the
//! region type used throughout the library is [`Region`], a
//! `geo::MultiPolygon<f64>`.
//!
//! # Empty areas
//!
//! Overlay operations (`difference`, `intersection`) can leave slivers whose
//! area is floating-point residue rather than real coverage. Any area at or
//! below [`EMPTY_AREA_TOLERANCE`] is treated as zero by [`is_negligible`].

use geo::{Area, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Relate};
use serde::{Deserialize, Serialize};

/// Area (in squared coordinate units) below which a region counts as empty.
pub const EMPTY_AREA_TOLERANCE: f64 = 1e-12;

/// The region type used by the projection selector and the caches.
pub type Region = MultiPolygon<f64>;

/// Returns `true` if `area` is zero for caching purposes.
#[inline]
pub fn is_negligible(area: f64) -> bool {
    area <= EMPTY_AREA_TOLERANCE
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    /// Create a bounding box, normalising swapped corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Check if this bbox overlaps another (shared edges count).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Area of the box.
    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// A box with zero width or height (or a non-finite corner).
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        !finite || is_negligible(self.area())
    }

    /// Convert to a rectangular [`Region`].
    pub fn to_region(&self) -> Region {
        region_from_bbox(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<geo::Rect<f64>> for BBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Build a rectangular region from its bounds.
pub fn region_from_bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Region {
    let bbox = BBox::new(min_x, min_y, max_x, max_y);
    let ring = vec![
        Coord { x: bbox.min_x, y: bbox.min_y },
        Coord { x: bbox.max_x, y: bbox.min_y },
        Coord { x: bbox.max_x, y: bbox.max_y },
        Coord { x: bbox.min_x, y: bbox.max_y },
        Coord { x: bbox.min_x, y: bbox.min_y },
    ];
    MultiPolygon::new(vec![Polygon::new(LineString::from(ring), vec![])])
}

/// Build a region from exterior rings given as `[x, y]` pairs.
///
/// Rings are closed automatically. Rings with fewer than three distinct
/// positions are skipped.
pub fn region_from_rings(rings: &[Vec<[f64; 2]>]) -> Region {
    let polygons = rings
        .iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| {
            let coords: Vec<Coord<f64>> =
                ring.iter().map(|[x, y]| Coord { x: *x, y: *y }).collect();
            // LineString -> Polygon closes the ring for us
            Polygon::new(LineString::from(coords), vec![])
        })
        .collect();
    MultiPolygon::new(polygons)
}

/// Geometry operations the caches are written against.
///
/// All operations are pure. Implementations must not panic on degenerate
/// input; an empty result is the expected outcome for empty overlays.
pub trait GeometryOps: Clone + Send + Sync {
    /// Planar area.
    fn area(&self) -> f64;

    /// Bounding box, `None` for an empty geometry.
    fn bounds(&self) -> Option<BBox>;

    /// `other` lies in `self`, with at least one interior point in common.
    fn contains(&self, other: &Self) -> bool;

    /// No point of `other` lies outside `self`.
    fn covers(&self, other: &Self) -> bool;

    /// The geometries share at least one point.
    fn intersects(&self, other: &Self) -> bool;

    fn intersection(&self, other: &Self) -> Self;

    fn difference(&self, other: &Self) -> Self;

    fn union(&self, other: &Self) -> Self;

    /// The geometry has no points.
    fn is_empty(&self) -> bool;
}

impl GeometryOps for Region {
    fn area(&self) -> f64 {
        self.unsigned_area()
    }

    fn bounds(&self) -> Option<BBox> {
        self.bounding_rect().map(BBox::from)
    }

    fn contains(&self, other: &Self) -> bool {
        if GeometryOps::is_empty(self) || GeometryOps::is_empty(other) {
            return false;
        }
        self.relate(other).is_contains()
    }

    fn covers(&self, other: &Self) -> bool {
        if GeometryOps::is_empty(other) {
            return false;
        }
        is_negligible(geo::BooleanOps::difference(other, self).unsigned_area())
    }

    fn intersects(&self, other: &Self) -> bool {
        geo::Intersects::intersects(self, other)
    }

    fn intersection(&self, other: &Self) -> Self {
        geo::BooleanOps::intersection(self, other)
    }

    fn difference(&self, other: &Self) -> Self {
        geo::BooleanOps::difference(self, other)
    }

    fn union(&self, other: &Self) -> Self {
        geo::BooleanOps::union(self, other)
    }

    fn is_empty(&self) -> bool {
        geo::HasDimensions::is_empty(self)
    }
}

/// Exposes the geometry of a cached item so coverage entries can be
/// filtered down to a sub-region.
pub trait HasGeometry {
    /// The item's geometry type (point, polygon, ...).
    type Geometry;

    fn geometry(&self) -> &Self::Geometry;
}

impl HasGeometry for geo::Geometry<f64> {
    type Geometry = geo::Geometry<f64>;

    fn geometry(&self) -> &Self::Geometry {
        self
    }
}

impl HasGeometry for geo::Point<f64> {
    type Geometry = geo::Point<f64>;

    fn geometry(&self) -> &Self::Geometry {
        self
    }
}
