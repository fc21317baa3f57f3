//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use mundi::config::ConfigFileError;
use mundi::pcs::{CatalogError, PcsError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Failed to load the projection catalog
    Catalog(CatalogError),
    /// Projection selection failed
    Selection(PcsError),
    /// Failed to render output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Catalog(CatalogError::Io { .. }) => {
                eprintln!();
                eprintln!("Set the catalog location with --catalog <PATH> or in the");
                eprintln!("[catalog] section of ~/.mundi/config.ini.");
            }
            CliError::Selection(PcsError::NoProjectionFound { .. }) => {
                eprintln!();
                eprintln!("Try --units meters, which falls back to a global projection.");
            }
            _ => {}
        }

        process::exit(match self {
            CliError::InvalidArgument(_) => 2,
            _ => 1,
        })
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Catalog(e) => write!(f, "Failed to load catalog: {}", e),
            CliError::Selection(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to render output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Catalog(e) => Some(e),
            CliError::Selection(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<PcsError> for CliError {
    fn from(e: PcsError) -> Self {
        match e {
            PcsError::InvalidInput(msg) => CliError::InvalidArgument(msg),
            PcsError::Catalog(e) => CliError::Catalog(e),
            other => CliError::Selection(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
