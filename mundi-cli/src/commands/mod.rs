//! CLI command implementations.
//!
//! - [`choose`] - Best-fit projection for a bounding box
//! - [`suggest`] - Ranked list of containing projections
//! - [`config`] - Configuration management (show, path, init)

pub mod choose;
pub mod common;
pub mod config;
pub mod suggest;
