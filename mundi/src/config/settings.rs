//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::cache::DEFAULT_MAXSIZE;

/// File name of the default catalog inside the config directory.
pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "mundi.log";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub catalog: CatalogSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

/// `[catalog]`
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    /// Projection catalog document.
    pub path: PathBuf,
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Entries kept per axis unit by the projection selector.
    pub footprint_maxsize: usize,
    /// Entries kept by a [`CoverageCache`](crate::cache::CoverageCache) built
    /// with `from_settings`.
    pub coverage_maxsize: usize,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = super::config_directory();
        Self {
            catalog: CatalogSettings {
                path: base.join(DEFAULT_CATALOG_FILE),
            },
            cache: CacheSettings::default(),
            logging: LoggingSettings {
                directory: base.join("logs"),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            footprint_maxsize: DEFAULT_MAXSIZE,
            coverage_maxsize: DEFAULT_MAXSIZE,
        }
    }
}
