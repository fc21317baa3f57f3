//! `mundi suggest` - ranked projections containing a bounding box.

use mundi::config::ConfigFile;
use mundi::pcs::{AxisUnit, CrsSummary, ProjectionSelector};

use super::common::{load_selector, RegionArgs};
use crate::error::CliError;

/// Run the suggest command, printing up to `count` projections as JSON.
pub fn run(args: RegionArgs, count: usize, config: &ConfigFile) -> Result<(), CliError> {
    let selector = load_selector(&args, config)?;
    let summaries = suggest(&selector, &args, count)?;

    if summaries.is_empty() {
        tracing::warn!("No catalog projection contains the region");
    }
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn suggest(
    selector: &ProjectionSelector,
    args: &RegionArgs,
    count: usize,
) -> Result<Vec<CrsSummary>, CliError> {
    let suggestions = selector.suggest(&args.bbox.to_region(), AxisUnit::from(args.units), count)?;
    Ok(suggestions.iter().map(|d| d.summary()).collect())
}
