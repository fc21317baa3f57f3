//! Coordinate-system descriptors.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::PcsError;
use crate::geometry::{GeometryOps, Region};

/// Unit of the projected axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisUnit {
    #[default]
    Meters,
    Feet,
}

impl AxisUnit {
    /// Lowercase name as stored in catalogs and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisUnit::Meters => "meters",
            AxisUnit::Feet => "feet",
        }
    }
}

impl fmt::Display for AxisUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisUnit {
    type Err = PcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meters" | "metres" | "metre" | "meter" | "m" => Ok(AxisUnit::Meters),
            "feet" | "foot" | "ft" => Ok(AxisUnit::Feet),
            other => Err(PcsError::InvalidInput(format!(
                "unknown axis unit '{}', expected 'meters' or 'feet'",
                other
            ))),
        }
    }
}

/// A projected coordinate system and the area it is valid for.
#[derive(Debug, Clone)]
pub struct CrsDescriptor {
    /// CRS identifier, e.g. `EPSG:26945`.
    pub identifier: String,
    /// Human-readable name.
    pub name: String,
    /// Numeric EPSG code, when the CRS has one.
    pub epsg: Option<u32>,
    pub axis_unit: AxisUnit,
    /// Where the projection is accurate, in WGS84 lon/lat.
    pub validity_region: Region,
    /// Area of `validity_region`, used to rank candidates.
    pub validity_area: f64,
}

impl CrsDescriptor {
    /// Descriptor for an EPSG-registered CRS.
    ///
    /// The validity area is computed from `validity_region`.
    pub fn epsg(code: u32, name: impl Into<String>, axis_unit: AxisUnit, region: Region) -> Self {
        let validity_area = region.area();
        Self {
            identifier: format!("EPSG:{}", code),
            name: name.into(),
            epsg: Some(code),
            axis_unit,
            validity_region: region,
            validity_area,
        }
    }

    /// Compact record for display and serialization.
    pub fn summary(&self) -> CrsSummary {
        CrsSummary {
            name: self.name.clone(),
            epsg: self.epsg,
            crs: self.identifier.clone(),
            units: self.axis_unit,
        }
    }
}

impl PartialEq for CrsDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.axis_unit == other.axis_unit
    }
}

impl fmt::Display for CrsDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.identifier, self.axis_unit)
    }
}

/// The identifying fields of a descriptor, without geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,
    pub crs: String,
    pub units: AxisUnit,
}

/// Outcome of a projection lookup.
///
/// A `None` validity region marks the global fallback, which has no bounded
/// footprint and is never cached.
#[derive(Debug, Clone)]
pub struct ProjectionResult {
    pub descriptor: Arc<CrsDescriptor>,
    pub validity_region: Option<Region>,
}

impl ProjectionResult {
    /// A local projection, valid inside its descriptor's region.
    pub fn local(descriptor: Arc<CrsDescriptor>) -> Self {
        let validity_region = Some(descriptor.validity_region.clone());
        Self {
            descriptor,
            validity_region,
        }
    }

    /// A projection with no bounded footprint.
    pub fn global(descriptor: Arc<CrsDescriptor>) -> Self {
        Self {
            descriptor,
            validity_region: None,
        }
    }

    pub fn is_global_fallback(&self) -> bool {
        self.validity_region.is_none()
    }
}
