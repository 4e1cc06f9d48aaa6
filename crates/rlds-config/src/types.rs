// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `rlds_mod.toml`:
//!
//! ```toml
//! [pipeline]
//! mods = ["resize_and_jpeg_encode", "filter_success"]
//! validate_output = true
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RldsModConfig {
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Which mod functions to apply, in order
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Registry names; a name may appear more than once
    pub mods: Vec<String>,
    /// Check every output episode against the final schema. Only applies where a dataset
    /// is pulled through `ModPipeline::apply`; the schema preview tool ignores it.
    pub validate_output: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (text or json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
