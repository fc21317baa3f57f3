//! Mundi CLI - Command-line interface
//!
//! Picks local projected coordinate systems for geographic bounding boxes.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mundi::config::ConfigFile;
use mundi::logging::{init_logging, LoggingGuard};

use commands::common::RegionArgs;
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Parser)]
#[command(name = "mundi")]
#[command(version = mundi::VERSION)]
#[command(about = "Pick local projected coordinate systems for regions", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.mundi/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the most local projection containing a bounding box
    Choose(RegionArgs),

    /// List projections containing a bounding box, most local first
    Suggest {
        #[command(flatten)]
        region: RegionArgs,

        /// Maximum number of suggestions
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    match cli.command {
        Commands::Choose(region) => {
            let _guard = start_logging(&config)?;
            commands::choose::run(region, &config)
        }
        Commands::Suggest { region, count } => {
            let _guard = start_logging(&config)?;
            commands::suggest::run(region, count, &config)
        }
        Commands::Config(command) => commands::config::run(command, &config),
    }
}

fn start_logging(config: &ConfigFile) -> Result<LoggingGuard, CliError> {
    init_logging(&config.logging.directory, &config.logging.file)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}
