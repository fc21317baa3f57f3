//! Projected coordinate system selection.
//!
//! Metric operations (areas, distances, buffers in meters) need a projected
//! CRS, and distortion grows with distance from a projection's area of use.
//! This module picks, for a query region, the most local projection from a
//! static catalog that still covers the whole region.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mundi::geometry::region_from_bbox;
//! use mundi::pcs::{AxisUnit, CrsDescriptor, MemoryCatalog, ProjectionSelector};
//!
//! let catalog = MemoryCatalog::new(vec![
//!     CrsDescriptor::epsg(32611, "WGS 84 / UTM zone 11N", AxisUnit::Meters,
//!         region_from_bbox(-120.0, 0.0, -114.0, 84.0)),
//! ]);
//! let selector = ProjectionSelector::new(Arc::new(catalog));
//!
//! let result = selector
//!     .select(&region_from_bbox(-118.5, 34.0, -118.0, 34.5), AxisUnit::Meters)
//!     .unwrap();
//! assert_eq!(result.descriptor.identifier, "EPSG:32611");
//! ```

mod catalog;
mod error;
mod selector;
mod types;

pub use catalog::{MemoryCatalog, ProjectionCatalog, MAX_VALIDITY_AREA};
pub use error::{CatalogError, PcsError};
pub use selector::{global_fallback, ProjectionSelector, GLOBAL_FALLBACK_CRS, GLOBAL_FALLBACK_NAME};
pub use types::{AxisUnit, CrsDescriptor, CrsSummary, ProjectionResult};
