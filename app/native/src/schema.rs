//! JSON Schema generation for the configuration file.
//!
//! The schema can be referenced from a config file (`"$schema": ...`) to get
//! editor completion and validation.

use schemars::{Schema, schema_for};

use crate::config::StackingConfig;

/// Generates the JSON Schema of [`StackingConfig`].
#[must_use]
pub fn generate_schema() -> Schema { schema_for!(StackingConfig) }

/// Returns the schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    serde_json::to_string_pretty(&generate_schema()).unwrap_or_else(|_| "{}".to_string())
}
