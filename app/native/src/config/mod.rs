//! Configuration module for Autostack.
//!
//! This module provides configuration types and loading functionality.
//! There is no global configuration: callers load a [`StackingConfig`] once
//! and pass it by reference.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod types;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub use types::{ConfigError, ConfigSource, HostRule, NamingMode, StackingConfig};

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".autostack.jsonc", ".autostack.json"];

/// Application directory name under the config roots.
const APP_DIR: &str = "autostack";

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/autostack/config.jsonc` if the variable is set
/// 2. `~/.config/autostack/config.jsonc`
/// 3. The platform config directory (`dirs::config_dir()`)
/// 4. `~/.autostack.jsonc` or `~/.autostack.json` (legacy/simple location)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let app_dir = PathBuf::from(xdg_config).join(APP_DIR);
        for filename in CONFIG_FILE_NAMES {
            paths.push(app_dir.join(filename));
        }
    }

    let mut push_unique = |path: PathBuf| {
        if !paths.contains(&path) {
            paths.push(path);
        }
    };

    if let Some(home) = dirs::home_dir() {
        let app_dir = home.join(".config").join(APP_DIR);
        for filename in CONFIG_FILE_NAMES {
            push_unique(app_dir.join(filename));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join(APP_DIR);
        for filename in CONFIG_FILE_NAMES {
            push_unique(app_dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            push_unique(home.join(filename));
        }
    }

    paths
}

/// Parses a configuration from a JSONC reader and compiles its rules.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for invalid JSON and
/// [`ConfigError::InvalidRule`] for host patterns that fail to compile.
pub fn parse_config<R: Read>(reader: R) -> Result<StackingConfig, ConfigError> {
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(reader);
    let mut config: StackingConfig = serde_json::from_reader(reader)?;
    config.prepare()?;
    Ok(config)
}

/// Parses a configuration from a JSONC string.
///
/// # Errors
///
/// See [`parse_config`].
pub fn parse_config_str(json: &str) -> Result<StackingConfig, ConfigError> {
    parse_config(json.as_bytes())
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns [`ConfigError::IoError`] if the file cannot be read, or any error
/// from [`parse_config`].
pub fn load_config_from_path(path: &Path) -> Result<StackingConfig, ConfigError> {
    let file = fs::File::open(path)?;
    parse_config(file)
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if no configuration file exists in any of
/// the expected locations, or any error from [`load_config_from_path`].
pub fn load_config() -> Result<(StackingConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let config = load_config_from_path(&path)?;
            return Ok((config, path));
        }
    }

    Err(ConfigError::NotFound)
}

/// Resolves the configuration to use at startup.
///
/// An explicit path must load successfully. Without one, the search paths are
/// tried and a missing file falls back to defaults.
///
/// # Errors
///
/// Returns an error if the explicit file (or the first file found) cannot be
/// loaded.
pub fn resolve_config(
    custom_path: Option<&Path>,
) -> Result<(StackingConfig, ConfigSource), ConfigError> {
    if let Some(path) = custom_path {
        let config = load_config_from_path(path)?;
        tracing::debug!("config: loaded {}", path.display());
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    match load_config() {
        Ok((config, path)) => {
            tracing::debug!("config: loaded {}", path.display());
            Ok((config, ConfigSource::File(path)))
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("config: no configuration file found, using defaults");
            Ok((StackingConfig::default(), ConfigSource::Defaults))
        }
        Err(err) => Err(err),
    }
}
