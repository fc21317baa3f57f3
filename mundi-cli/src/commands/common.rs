//! Arguments and helpers shared by the projection commands.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use mundi::config::ConfigFile;
use mundi::geometry::BBox;
use mundi::pcs::{AxisUnit, MemoryCatalog, ProjectionSelector};

use crate::error::CliError;

/// Axis unit selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum UnitArg {
    /// Meter-based projections (falls back to World Mollweide)
    Meters,
    /// Foot-based projections (US state plane and similar)
    Feet,
}

impl From<UnitArg> for AxisUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Meters => AxisUnit::Meters,
            UnitArg::Feet => AxisUnit::Feet,
        }
    }
}

/// Region and catalog arguments.
#[derive(Debug, Args)]
pub struct RegionArgs {
    /// Bounding box in WGS84 degrees: minx,miny,maxx,maxy
    #[arg(long, allow_hyphen_values = true, value_parser = parse_bbox)]
    pub bbox: BBox,

    /// Unit of the projected axes
    #[arg(long, value_enum, default_value = "meters")]
    pub units: UnitArg,

    /// Projection catalog (overrides [catalog] path in config.ini)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// Parse `minx,miny,maxx,maxy`.
pub fn parse_bbox(s: &str) -> Result<BBox, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{}': {}", s, e))?;

    let [min_x, min_y, max_x, max_y] = values[..] else {
        return Err(format!(
            "expected 4 comma-separated values (minx,miny,maxx,maxy), got {}",
            values.len()
        ));
    };

    if min_x > max_x || min_y > max_y {
        return Err(format!(
            "minimum exceeds maximum in '{}' (expected minx,miny,maxx,maxy)",
            s
        ));
    }

    Ok(BBox::new(min_x, min_y, max_x, max_y))
}

/// Load the catalog named on the command line or in config.
pub fn load_selector(args: &RegionArgs, config: &ConfigFile) -> Result<ProjectionSelector, CliError> {
    let path = args.catalog.as_ref().unwrap_or(&config.catalog.path);
    tracing::debug!(path = %path.display(), "Loading projection catalog");

    let catalog = MemoryCatalog::load_from(path)?;
    Ok(ProjectionSelector::with_cache_size(
        Arc::new(catalog),
        config.cache.footprint_maxsize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_bbox() {
        let bbox = parse_bbox("-118.84, 34.05,-118.14,34.55").unwrap();
        assert_eq!(bbox, BBox::new(-118.84, 34.05, -118.14, 34.55));
    }

    #[test]
    fn test_parse_bbox_rejects_wrong_arity() {
        assert!(parse_bbox("1,2,3").unwrap_err().contains("got 3"));
        assert!(parse_bbox("1,2,3,4,5").is_err());
    }

    #[test]
    fn test_parse_bbox_rejects_garbage() {
        assert!(parse_bbox("a,b,c,d").unwrap_err().contains("invalid number"));
    }

    #[test]
    fn test_parse_bbox_rejects_swapped_corners() {
        assert!(parse_bbox("10,0,0,10").is_err());
    }

    #[test]
    fn test_catalog_argument_overrides_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"entries": []}"#).unwrap();

        let args = RegionArgs {
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            units: UnitArg::Meters,
            catalog: Some(file.path().to_path_buf()),
        };
        let mut config = ConfigFile::default();
        config.catalog.path = PathBuf::from("/nonexistent/catalog.json");

        assert!(load_selector(&args, &config).is_ok());
    }

    #[test]
    fn test_missing_catalog_is_reported() {
        let args = RegionArgs {
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            units: UnitArg::Meters,
            catalog: Some(PathBuf::from("/nonexistent/catalog.json")),
        };
        let err = load_selector(&args, &ConfigFile::default()).unwrap_err();
        assert!(matches!(err, CliError::Catalog(_)));
    }
}
