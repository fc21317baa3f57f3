//! Mundi - region-aware projection selection and spatial result caching
//!
//! This library answers two recurring questions for geospatial computation:
//! which projected coordinate system gives accurate metric results for a
//! region, and how much of a region's data has already been fetched.
//!
//! - [`pcs`] picks the most local projection from a static catalog
//! - [`cache`] provides the containment-keyed [`FootprintCache`] and the
//!   set-difference based [`CoverageCache`]
//! - [`geometry`] binds both to the `geo` crate

pub mod cache;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod pcs;

pub use cache::{CacheStats, CoverageCache, FootprintCache};
pub use geometry::{BBox, GeometryOps, Region};
pub use pcs::{AxisUnit, CrsDescriptor, PcsError, ProjectionSelector};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
