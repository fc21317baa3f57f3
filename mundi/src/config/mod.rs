//! User configuration for mundi.
//!
//! Settings live in `~/.mundi/config.ini`:
//!
//! ```text
//! [catalog]
//! path = ~/.mundi/catalog.json
//!
//! [cache]
//! footprint_maxsize = 128
//! coverage_maxsize = 128
//!
//! [logging]
//! directory = ~/.mundi/logs
//! file = mundi.log
//! ```
//!
//! A missing file yields defaults. Settings structs live in `settings`,
//! INI parsing in `parser` and serialization in `writer`.

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, CatalogSettings, ConfigFile, LoggingSettings, DEFAULT_CATALOG_FILE,
    DEFAULT_LOG_FILE,
};
