// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that a loaded configuration can drive a pipeline. Whether each mod name
//! is actually registered is decided by the registry when the pipeline is built.

use crate::{ConfigError, ConfigResult, RldsModConfig};

/// Accepted values for `logging.level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Accepted values for `logging.format`
pub const LOG_FORMATS: &[&str] = &["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - At least one mod function listed
/// - Well formed mod names (non-empty, no whitespace); repeats are allowed
/// - Known log level and format
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &RldsModConfig) -> ConfigResult<()> {
    let errors = collect_validation_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Returns every validation problem, in section order.
pub fn collect_validation_errors(config: &RldsModConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_pipeline(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_pipeline(config: &RldsModConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.pipeline.mods.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "pipeline.mods".to_string(),
        });
    }

    for (index, name) in config.pipeline.mods.iter().enumerate() {
        if name.is_empty() {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("pipeline.mods[{}]", index),
                reason: "mod function name is empty".to_string(),
            });
        } else if name.chars().any(char::is_whitespace) {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("pipeline.mods[{}]", index),
                reason: format!("'{}' contains whitespace", name),
            });
        }
    }
}

fn validate_logging(config: &RldsModConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }

    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.format, LOG_FORMATS.join(", ")),
        });
    }
}
