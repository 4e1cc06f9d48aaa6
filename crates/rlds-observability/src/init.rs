// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Installs one console subscriber for the process. Output goes to stderr so
//! tools can keep stdout for their own results.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::LogFormat;

/// Builds the filter for `default_level` plus any per-crate debug flags.
pub fn build_env_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(default_level);
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter: {}", directives))
}

/// Initialize logging
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags, raised to `debug`
/// * `default_level` - Level for everything else (trace, debug, info, warn, error)
/// * `format` - Text or JSON lines
///
/// # Errors
/// Fails if the level is not a valid filter or a global subscriber is already set.
pub fn init_logging(debug_flags: &CrateDebugFlags, default_level: &str, format: LogFormat) -> Result<()> {
    let env_filter = build_env_filter(debug_flags, default_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(
        "Logging initialised (level: {}, format: {}, debug crates: {:?})",
        default_level,
        format,
        debug_flags.enabled_crates()
    );
    Ok(())
}

/// Initialize text logging at `info` with flags from the process arguments and environment
pub fn init_logging_default() -> Result<()> {
    init_logging(&crate::cli::parse_debug_flags(), "info", LogFormat::Text)
}
