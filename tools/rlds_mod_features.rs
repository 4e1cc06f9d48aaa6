// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Feature Schema Preview Tool

Applies a mod function pipeline to a dataset's feature schema (JSON) and writes
the schema the modified dataset will have.

Usage:
  cargo run --bin rlds_mod_features -- <input_features.json> <output_features.json> [--config <rlds_mod.toml>] [--mods a,b] [--debug-<crate>]

Only the schema is transformed, so `pipeline.validate_output` has no effect here.

Example:
  cargo run --bin rlds_mod_features -- features.json features_256.json --mods resize_and_jpeg_encode,filter_success
*/

use anyhow::{bail, Context, Result};
use rlds_dataset_mod::config::loader::CONFIG_PATH_ENV;
use rlds_dataset_mod::config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config, validate_config, RldsModConfig,
};
use rlds_dataset_mod::mod_functions::ModFunctionRegistry;
use rlds_dataset_mod::observability::{debug_flags_help, init_logging, parse_debug_flags, LogFormat};
use rlds_dataset_mod::{pipeline_from_config, transform_features_file};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

struct ToolArgs {
    input: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <input_features.json> <output_features.json> [--config <path>] [--mods a,b]\n\n{}",
        program,
        debug_flags_help()
    )
}

fn parse_args(args: &[String]) -> Result<ToolArgs> {
    let program = args.first().map(String::as_str).unwrap_or("rlds_mod_features");
    let mut positional = Vec::new();
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().with_context(|| format!("--config needs a path\n\n{}", usage(program)))?;
                config_path = Some(PathBuf::from(value));
            }
            "--mods" => {
                let value = iter.next().with_context(|| format!("--mods needs a list\n\n{}", usage(program)))?;
                overrides.insert("pipeline.mods".to_string(), value.clone());
            }
            // handled by parse_debug_flags
            other if other.starts_with("--debug-") => {}
            other if other.starts_with("--") => bail!("Unknown option '{}'\n\n{}", other, usage(program)),
            other => positional.push(PathBuf::from(other)),
        }
    }

    let [input, output]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("Expected an input and an output path\n\n{}", usage(program)))?;
    Ok(ToolArgs {
        input,
        output,
        config_path,
        overrides,
    })
}

fn resolve_config(config_path: Option<&Path>, overrides: &HashMap<String, String>) -> Result<RldsModConfig> {
    // an explicit or env-named file must load; otherwise fall back to defaults plus overrides
    if config_path.is_some() || env::var(CONFIG_PATH_ENV).is_ok() || find_config_file().is_ok() {
        return Ok(load_config(config_path, Some(overrides))?);
    }
    let mut config = RldsModConfig::default();
    apply_environment_overrides(&mut config);
    apply_cli_overrides(&mut config, overrides);
    Ok(config)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let tool_args = parse_args(&args)?;

    let config = resolve_config(tool_args.config_path.as_deref(), &tool_args.overrides)?;
    validate_config(&config)?;

    let format: LogFormat = config.logging.format.parse()?;
    init_logging(&parse_debug_flags(), &config.logging.level, format)?;

    let registry = ModFunctionRegistry::builtin();
    let pipeline = pipeline_from_config(&registry, &config)?;
    let features = transform_features_file(&pipeline, &tool_args.input, &tool_args.output)?;

    println!("Mods:    {}", pipeline.names().join(" -> "));
    println!("Input:   {}", tool_args.input.display());
    println!("Output:  {} ({} top-level features)", tool_args.output.display(), features.len());
    Ok(())
}
