//! Stacking configuration types.
//!
//! Loaded once at startup and passed by reference to every component.

use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use super::rules::HostRule;
use crate::stacking::constants::timing::DEFAULT_SETTLE_DELAY_MS;

/// How stacks get their display names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NamingMode {
    /// Leave stack names alone (`0`).
    #[default]
    Disabled,
    /// Use the grouping key verbatim (`1`).
    Hostname,
    /// Capitalized first label of the base domain (`2`).
    BaseDomain,
}

impl NamingMode {
    /// Returns true unless naming is disabled.
    #[must_use]
    pub const fn is_enabled(self) -> bool { !matches!(self, Self::Disabled) }
}

impl TryFrom<u8> for NamingMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::Hostname),
            2 => Ok(Self::BaseDomain),
            other => Err(format!("invalid naming mode {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<NamingMode> for u8 {
    fn from(mode: NamingMode) -> Self {
        match mode {
            NamingMode::Disabled => 0,
            NamingMode::Hostname => 1,
            NamingMode::BaseDomain => 2,
        }
    }
}

impl JsonSchema for NamingMode {
    fn schema_name() -> Cow<'static, str> { Cow::Borrowed("NamingMode") }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "integer",
            "enum": [0, 1, 2],
            "description": "0: disabled, 1: use the hostname, 2: generated from the base domain"
        })
    }
}

/// Automatic tab stacking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StackingConfig {
    /// Stack tabs in workspaces other than the default one.
    /// Default: true
    #[serde(alias = "workspace")]
    pub apply_in_non_default_workspace: bool,

    /// Group by full hostname instead of base domain.
    /// Default: true
    #[serde(alias = "subdomain")]
    pub group_by_subdomain: bool,

    /// Automatically rename stacks.
    /// Default: 0 (disabled)
    #[serde(alias = "stackname")]
    pub naming_mode: NamingMode,

    /// Hosts to include. An empty list includes every host.
    pub includes: Vec<HostRule>,

    /// Hosts to exclude. Exclusion wins over inclusion.
    pub excludes: Vec<HostRule>,

    /// Extra multi-label public suffixes (e.g. "github.io") used when
    /// computing base domains.
    pub public_suffixes: Vec<String>,

    /// Delay in milliseconds between a navigation commit and the stacking pass.
    /// Default: 100
    pub settle_delay_ms: u64,
}

impl Default for StackingConfig {
    fn default() -> Self {
        Self {
            apply_in_non_default_workspace: true,
            group_by_subdomain: true,
            naming_mode: NamingMode::Disabled,
            includes: Vec::new(),
            excludes: Vec::new(),
            public_suffixes: Vec::new(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl StackingConfig {
    /// Compiles all pattern rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRule`] for the first pattern that fails to compile.
    pub fn prepare(&mut self) -> Result<(), ConfigError> {
        for rule in self.includes.iter_mut().chain(self.excludes.iter_mut()) {
            rule.prepare().map_err(|err| ConfigError::InvalidRule {
                pattern: rule.source().to_string(),
                message: err.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_documented_defaults() {
        let config = StackingConfig::default();
        assert!(config.apply_in_non_default_workspace);
        assert!(config.group_by_subdomain);
        assert_eq!(config.naming_mode, NamingMode::Disabled);
        assert!(config.includes.is_empty());
        assert!(config.excludes.is_empty());
        assert_eq!(config.settle_delay_ms, 100);
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let json = r#"{
            "applyInNonDefaultWorkspace": false,
            "groupBySubdomain": false,
            "namingMode": 2,
            "excludes": ["chat.example.com"]
        }"#;

        let config: StackingConfig = serde_json::from_str(json).unwrap();
        assert!(!config.apply_in_non_default_workspace);
        assert!(!config.group_by_subdomain);
        assert_eq!(config.naming_mode, NamingMode::BaseDomain);
        assert_eq!(config.excludes.len(), 1);
    }

    #[test]
    fn test_config_accepts_short_aliases() {
        let json = r#"{ "workspace": false, "subdomain": true, "stackname": 1 }"#;

        let config: StackingConfig = serde_json::from_str(json).unwrap();
        assert!(!config.apply_in_non_default_workspace);
        assert_eq!(config.naming_mode, NamingMode::Hostname);
    }

    #[test]
    fn test_naming_mode_rejects_unknown_values() {
        let result: Result<StackingConfig, _> = serde_json::from_str(r#"{ "namingMode": 3 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_naming_mode_round_trips_as_integer() {
        let json = serde_json::to_string(&NamingMode::Hostname).unwrap();
        assert_eq!(json, "1");
        assert!(NamingMode::Hostname.is_enabled());
        assert!(!NamingMode::Disabled.is_enabled());
    }

    #[test]
    fn test_prepare_reports_invalid_pattern() {
        let json = r#"{ "includes": [{ "pattern": "([a-z" }] }"#;
        let mut config: StackingConfig = serde_json::from_str(json).unwrap();

        let err = config.prepare().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { ref pattern, .. } if pattern == "([a-z"));
    }
}
