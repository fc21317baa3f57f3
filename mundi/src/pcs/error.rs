//! Error types for projection selection and catalog loading.

use std::path::PathBuf;

use thiserror::Error;

use super::AxisUnit;

/// Errors raised while loading a projection catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// An entry is malformed in a way the loader cannot skip over.
    #[error("Invalid catalog entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

/// Errors raised by the projection selector.
#[derive(Debug, Error)]
pub enum PcsError {
    /// No catalog entry contains the region for the requested unit.
    #[error("No projected coordinate system in {unit} contains the region")]
    NoProjectionFound { unit: AxisUnit },

    /// The region (or another argument) cannot be used for selection.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_projection_found_display() {
        let err = PcsError::NoProjectionFound {
            unit: AxisUnit::Feet,
        };
        assert_eq!(
            err.to_string(),
            "No projected coordinate system in feet contains the region"
        );
    }

    #[test]
    fn test_invalid_entry_display() {
        let err = CatalogError::InvalidEntry {
            index: 4,
            reason: "epsg code missing".to_string(),
        };
        assert!(err.to_string().contains("entry 4"));
        assert!(err.to_string().contains("epsg code missing"));
    }

    #[test]
    fn test_catalog_error_converts_to_pcs_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PcsError = CatalogError::from(parse_err).into();
        assert!(matches!(err, PcsError::Catalog(CatalogError::Parse(_))));
    }
}
