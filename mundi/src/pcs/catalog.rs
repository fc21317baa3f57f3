//! Static catalog of projected coordinate systems.
//!
//! The catalog is loaded once and is read-only afterwards. Its only query is a
//! cheap bounding-box pre-filter; exact containment is checked by the
//! selector.
//!
//! # File format
//!
//! Catalogs are JSON documents:
//!
//! ```text
//! {
//!   "entries": [
//!     {
//!       "epsg": 26945,
//!       "name": "NAD83 / California zone 5",
//!       "axis_unit": "meters",
//!       "deprecated": false,
//!       "area": 26.6,
//!       "polygons": [[[-121.0, 32.0], [-114.0, 32.0], [-114.0, 35.8], [-121.0, 35.8]]]
//!     }
//!   ]
//! }
//! ```
//!
//! `crs` may replace `epsg` for non-EPSG authorities (`"crs": "ESRI:102003"`).
//! `area` is optional and is computed from the polygons when missing.
//! Deprecated entries, entries without geometry, entries with an axis unit
//! other than meters or feet, and entries larger than [`MAX_VALIDITY_AREA`]
//! are skipped at load.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::{AxisUnit, CatalogError, CrsDescriptor};
use crate::geometry::{is_negligible, region_from_rings, BBox, GeometryOps};

/// Largest validity area (square degrees) a catalog entry may have.
///
/// 8100 is one quadrant of the globe. Projections claiming more than that
/// are not local and are left to the global fallback.
pub const MAX_VALIDITY_AREA: f64 = 8100.0;

/// Source of coordinate-system descriptors.
pub trait ProjectionCatalog: Send + Sync {
    /// All descriptors whose validity-region bounding box overlaps `bbox`.
    fn query(&self, bbox: &BBox) -> Vec<Arc<CrsDescriptor>>;
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    epsg: Option<u32>,
    #[serde(default)]
    crs: Option<String>,
    name: String,
    axis_unit: String,
    #[serde(default)]
    deprecated: bool,
    #[serde(default)]
    area: Option<f64>,
    #[serde(default)]
    polygons: Vec<Vec<[f64; 2]>>,
}

impl RawEntry {
    /// Convert to a descriptor, or `Ok(None)` if the entry is filtered out.
    fn into_descriptor(self, index: usize) -> Result<Option<CrsDescriptor>, CatalogError> {
        let identifier = match (&self.crs, self.epsg) {
            (Some(crs), _) => crs.clone(),
            (None, Some(code)) => format!("EPSG:{}", code),
            (None, None) => {
                return Err(CatalogError::InvalidEntry {
                    index,
                    reason: "entry has neither 'epsg' nor 'crs'".to_string(),
                })
            }
        };

        if self.deprecated {
            tracing::trace!(identifier = %identifier, "Skipping deprecated catalog entry");
            return Ok(None);
        }

        let Ok(axis_unit) = self.axis_unit.parse::<AxisUnit>() else {
            tracing::trace!(
                identifier = %identifier,
                unit = %self.axis_unit,
                "Skipping entry with unsupported unit"
            );
            return Ok(None);
        };

        let validity_region = region_from_rings(&self.polygons);
        if validity_region.is_empty() {
            tracing::trace!(identifier = %identifier, "Skipping catalog entry without geometry");
            return Ok(None);
        }

        let validity_area = self.area.unwrap_or_else(|| validity_region.area());
        if is_negligible(validity_area) || validity_area > MAX_VALIDITY_AREA {
            tracing::trace!(
                identifier = %identifier,
                validity_area,
                "Skipping catalog entry by area"
            );
            return Ok(None);
        }

        Ok(Some(CrsDescriptor {
            identifier,
            name: self.name,
            epsg: self.epsg,
            axis_unit,
            validity_region,
            validity_area,
        }))
    }
}

/// In-memory catalog with precomputed validity-region bounds.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    descriptors: Vec<Arc<CrsDescriptor>>,
    bounds: Vec<BBox>,
}

impl MemoryCatalog {
    /// Build a catalog from descriptors.
    ///
    /// Descriptors with an empty validity region are dropped.
    pub fn new(descriptors: impl IntoIterator<Item = CrsDescriptor>) -> Self {
        let mut catalog = Self::default();
        for descriptor in descriptors {
            let Some(bbox) = descriptor.validity_region.bounds() else {
                tracing::debug!(
                    identifier = %descriptor.identifier,
                    "Dropping descriptor with empty validity region"
                );
                continue;
            };
            catalog.bounds.push(bbox);
            catalog.descriptors.push(Arc::new(descriptor));
        }
        catalog
    }

    /// Parse a catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let total = document.entries.len();

        let mut descriptors = Vec::with_capacity(total);
        for (index, entry) in document.entries.into_iter().enumerate() {
            if let Some(descriptor) = entry.into_descriptor(index)? {
                descriptors.push(descriptor);
            }
        }

        let catalog = Self::new(descriptors);
        tracing::info!(
            loaded = catalog.len(),
            skipped = total - catalog.len(),
            "Projection catalog loaded"
        );
        Ok(catalog)
    }

    /// Load a catalog document from disk.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Reading projection catalog");
        Self::from_json_str(&json)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All descriptors in load order.
    pub fn descriptors(&self) -> &[Arc<CrsDescriptor>] {
        &self.descriptors
    }
}

impl ProjectionCatalog for MemoryCatalog {
    fn query(&self, bbox: &BBox) -> Vec<Arc<CrsDescriptor>> {
        self.bounds
            .iter()
            .zip(&self.descriptors)
            .filter(|(bounds, _)| bounds.intersects(bbox))
            .map(|(_, descriptor)| Arc::clone(descriptor))
            .collect()
    }
}
