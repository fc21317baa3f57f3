//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[catalog]
; Projection catalog (JSON document of projected coordinate systems)
path = {}

[cache]
; Footprints kept per axis unit by the projection selector
footprint_maxsize = {}
; Entries kept by coverage caches
coverage_maxsize = {}

[logging]
; Directory for log files
directory = {}
; Log file name
file = {}
"#,
        path_to_string(&config.catalog.path),
        config.cache.footprint_maxsize,
        config.cache.coverage_maxsize,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Render a path, collapsing the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(relative) = path.strip_prefix(&home) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_lists_every_section() {
        let output = to_config_string(&ConfigFile::default());
        assert!(output.contains("[catalog]"));
        assert!(output.contains("[cache]"));
        assert!(output.contains("[logging]"));
        assert!(output.contains("footprint_maxsize = 128"));
    }

    #[test]
    fn test_home_paths_collapse_to_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path_to_string(&home.join("x.json")), "~/x.json");
        }
        assert_eq!(path_to_string(&PathBuf::from("/srv/x.json")), "/srv/x.json");
    }
}
