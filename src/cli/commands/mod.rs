//! CLI command handlers for `coursecompass`.
//!
//! Each command is implemented in its own submodule.

pub mod config;
pub mod query;
pub mod train;

use course_compass::core::store::{csv_loader, InMemoryStore};
use course_compass::{error, Config};
use std::path::Path;

/// Load the CSV inputs named in `[data]`
///
/// # Errors
/// Returns a printable `✗ ...` message when any file is missing or invalid
pub fn load_store(config: &Config) -> Result<InMemoryStore, String> {
    csv_loader::load_store(
        Path::new(&config.data.catalog_file),
        Path::new(&config.data.prerequisites_file),
        Path::new(&config.data.transcripts_file),
    )
    .map_err(|e| {
        error!("Failed to load input data: {e}");
        format!("✗ Failed to load input data: {e}")
    })
}
