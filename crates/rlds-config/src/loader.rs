// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Values are resolved in three tiers, later tiers winning:
//! 1. TOML file (base values, missing keys take defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, RldsModConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "RLDS_MOD_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `RLDS_MOD_CONFIG_PATH` environment variable
/// 2. Current working directory: `./rlds_mod.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(cwd.ancestors().skip(1).take(5).map(|dir| dir.join(CONFIG_FILE_NAME)));
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Validation is left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<RldsModConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: RldsModConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `RLDS_MOD_MODS` -> `pipeline.mods` (comma separated)
/// - `RLDS_MOD_VALIDATE_OUTPUT` -> `pipeline.validate_output`
/// - `RLDS_MOD_LOG_LEVEL` -> `logging.level`
/// - `RLDS_MOD_LOG_FORMAT` -> `logging.format`
pub fn apply_environment_overrides(config: &mut RldsModConfig) {
    if let Ok(value) = env::var("RLDS_MOD_MODS") {
        config.pipeline.mods = parse_mod_list(&value);
    }
    if let Ok(value) = env::var("RLDS_MOD_VALIDATE_OUTPUT") {
        config.pipeline.validate_output = parse_flag(&value);
    }
    if let Ok(value) = env::var("RLDS_MOD_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("RLDS_MOD_LOG_FORMAT") {
        config.logging.format = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Keyed by dotted path, e.g. `{"pipeline.mods": "filter_success,flip_image_channels"}`
pub fn apply_cli_overrides(config: &mut RldsModConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("pipeline.mods") {
        config.pipeline.mods = parse_mod_list(value);
    }
    if let Some(value) = cli_args.get("pipeline.validate_output") {
        config.pipeline.validate_output = parse_flag(value);
    }
    if let Some(value) = cli_args.get("logging.level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("logging.format") {
        config.logging.format = value.clone();
    }
}

/// Splits a comma separated list, dropping blanks. Order and repeats are kept.
fn parse_mod_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 4] = [
        "RLDS_MOD_MODS",
        "RLDS_MOD_VALIDATE_OUTPUT",
        "RLDS_MOD_LOG_LEVEL",
        "RLDS_MOD_LOG_FORMAT",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing_file() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();

        env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[pipeline]").unwrap();
        writeln!(file, "mods = [\"resize_and_jpeg_encode\", \"filter_success\"]").unwrap();
        writeln!(file, "validate_output = true").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.pipeline.mods, vec!["resize_and_jpeg_encode", "filter_success"]);
        assert!(config.pipeline.validate_output);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_load_invalid_toml() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[pipeline\nmods = 3").unwrap();

        assert!(matches!(load_config(Some(&config_path), None), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = RldsModConfig::default();

        env::set_var("RLDS_MOD_MODS", "flip_image_channels, ,filter_success");
        env::set_var("RLDS_MOD_VALIDATE_OUTPUT", "YES");
        env::set_var("RLDS_MOD_LOG_LEVEL", "debug");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.pipeline.mods, vec!["flip_image_channels", "filter_success"]);
        assert!(config.pipeline.validate_output);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = RldsModConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("pipeline.mods".to_string(), "filter_success".to_string());
        cli_args.insert("logging.format".to_string(), "json".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.pipeline.mods, vec!["filter_success"]);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[pipeline]").unwrap();
        writeln!(file, "mods = [\"filter_success\"]").unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"warn\"").unwrap();

        env::set_var("RLDS_MOD_MODS", "flip_image_channels");
        env::set_var("RLDS_MOD_LOG_LEVEL", "error");

        let mut cli_args = HashMap::new();
        cli_args.insert("pipeline.mods".to_string(), "resize_and_jpeg_encode".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_override_vars();

        // CLI wins for mods, env wins for level (no CLI override)
        assert_eq!(config.pipeline.mods, vec!["resize_and_jpeg_encode"]);
        assert_eq!(config.logging.level, "error");
    }
}
