//! Schema preview: run a configured pipeline over a feature schema file.

use anyhow::{Context, Result};
use rlds_config::RldsModConfig;
use rlds_mod_functions::{ModFunctionRegistry, ModPipeline};
use rlds_structures::{FeaturesDict, RldsResult};
use std::fs;
use std::path::Path;
use tracing::info;

/// Builds the pipeline a configuration describes.
pub fn pipeline_from_config(
    registry: &ModFunctionRegistry,
    config: &RldsModConfig,
) -> RldsResult<ModPipeline> {
    let pipeline = ModPipeline::from_names(registry, config.pipeline.mods.as_slice())?;
    Ok(pipeline.with_output_validation(config.pipeline.validate_output))
}

/// Reads a JSON feature schema, applies `pipeline` to it and writes the result as JSON.
///
/// Returns the transformed schema.
pub fn transform_features_file(pipeline: &ModPipeline, input: &Path, output: &Path) -> Result<FeaturesDict> {
    let json =
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let features = FeaturesDict::from_json_str(&json)
        .with_context(|| format!("Invalid feature schema in {}", input.display()))?;

    let transformed = pipeline.apply_features(&features)?;
    fs::write(output, transformed.to_json_string_pretty()?)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote transformed features of {} top-level entries to {}",
        transformed.len(),
        output.display()
    );
    Ok(transformed)
}
