//! `mundi choose` - best-fit projection for a bounding box.

use mundi::config::ConfigFile;
use mundi::pcs::{AxisUnit, ProjectionResult, ProjectionSelector};
use serde_json::{json, Value};

use super::common::{load_selector, RegionArgs};
use crate::error::CliError;

/// Run the choose command, printing the selected projection as JSON.
pub fn run(args: RegionArgs, config: &ConfigFile) -> Result<(), CliError> {
    let selector = load_selector(&args, config)?;
    let output = choose(&selector, &args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn choose(selector: &ProjectionSelector, args: &RegionArgs) -> Result<Value, CliError> {
    let unit = AxisUnit::from(args.units);
    let result = selector.select(&args.bbox.to_region(), unit)?;

    tracing::info!(
        crs = %result.descriptor.identifier,
        global = result.is_global_fallback(),
        "Projection chosen"
    );
    render(&result)
}

fn render(result: &ProjectionResult) -> Result<Value, CliError> {
    let mut output = serde_json::to_value(result.descriptor.summary())?;
    if let Value::Object(fields) = &mut output {
        fields.insert("global".to_string(), json!(result.is_global_fallback()));
    }
    Ok(output)
}
