//! Configuration types for Autostack.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod rules;
pub mod stacking;

use std::fmt;

pub use rules::HostRule;
pub use stacking::{NamingMode, StackingConfig};

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/autostack/config.jsonc, \
         the platform config directory, or ~/.autostack.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
    /// A host pattern is not a valid regular expression.
    #[error("Invalid host pattern '{pattern}': {message}")]
    InvalidRule {
        /// The offending pattern source.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults, no file found.
    Defaults,
    /// Loaded from this file.
    File(std::path::PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => f.write_str("defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
