//! Configuration management CLI commands.

use std::path::Path;

use clap::Subcommand;
use mundi::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Write a config file with default settings if none exists
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config: &ConfigFile) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            print!("{}", describe(config));
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Init => run_init(&config_file_path()),
    }
}

fn describe(config: &ConfigFile) -> String {
    format!(
        "[catalog]\n  path = {}\n\n\
         [cache]\n  footprint_maxsize = {}\n  coverage_maxsize = {}\n\n\
         [logging]\n  directory = {}\n  file = {}\n",
        config.catalog.path.display(),
        config.cache.footprint_maxsize,
        config.cache.coverage_maxsize,
        config.logging.directory.display(),
        config.logging.file,
    )
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    ConfigFile::default().save_to(path)?;
    println!("Created {}", path.display());
    Ok(())
}
