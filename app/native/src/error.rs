//! Error types for Autostack.
//!
//! This module provides the unified error type used throughout the crate.
//! Stacking passes swallow most of these (a failed mutation only leaves one tab
//! where it was), but the collaborators and the CLI report them through here.

use serde::Serialize;
use thiserror::Error;

use crate::stacking::TabId;

/// Result type alias for Autostack operations.
pub type Result<T, E = AutostackError> = std::result::Result<T, E>;

/// Errors that can occur while stacking tabs.
///
/// Serializes as `{ "kind": ..., "message": ... }` so the CLI can print it as JSON.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AutostackError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// The tab id no longer resolves (closed mid-pass).
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),
    /// A tab's stored metadata blob could not be decoded.
    #[error("Malformed metadata for tab {tab_id}: {reason}")]
    MalformedMetadata {
        /// The tab carrying the bad payload.
        tab_id: TabId,
        /// Decoder message.
        reason: String,
    },
    /// The tab directory rejected or failed a request.
    #[error("Tab directory error: {0}")]
    DirectoryError(String),
    /// Reading or writing stack names failed.
    #[error("Name store error: {0}")]
    NameStoreError(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl AutostackError {
    /// Creates a malformed metadata error for the given tab.
    #[must_use]
    pub fn malformed(tab_id: TabId, reason: impl Into<String>) -> Self {
        Self::MalformedMetadata { tab_id, reason: reason.into() }
    }
}

impl From<std::io::Error> for AutostackError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for AutostackError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<crate::config::ConfigError> for AutostackError {
    fn from(err: crate::config::ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<String> for AutostackError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for AutostackError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
