//! Core state types for the stacking engine.
//!
//! These types form the typed view of the host's tab strip:
//! - `TabRecord` is what the host hands out (metadata still encoded as JSON)
//! - `Tab` is the decoded form the engine works with
//! - `StackId` identifies a stack (ID is a UUID v7 string when minted here)
//! - `WorkspaceKey` partitions tabs; it is only ever used as a map key
//!
//! Relations:
//! - `Tab.workspace` → `WorkspaceKey`
//! - `Tab.stack` → `StackSlot` (a `StackId` or the "no stack" sentinel)

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::constants::{GROUP_FIELD, PANEL_FIELD, UNSTACKED_SENTINEL, WORKSPACE_FIELD};
use crate::error::{AutostackError, Result};

// ============================================================================
// Identifiers
// ============================================================================

/// Host-assigned tab identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i64);

impl TabId {
    /// Handle the host uses for tabs that are closing or not real tabs.
    pub const INVALID: Self = Self(-1);

    /// Wrap a raw host id.
    #[must_use]
    pub const fn new(id: i64) -> Self { Self(id) }

    /// The raw host id.
    #[must_use]
    pub const fn get(self) -> i64 { self.0 }

    /// Returns false for the invalid handle.
    #[must_use]
    pub const fn is_valid(self) -> bool { self.0 != Self::INVALID.0 }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Opaque stack identity.
///
/// Ordering is plain string ordering; collisions between several identities
/// for one grouping key are resolved by taking the smallest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(String);

impl StackId {
    /// Wrap an existing identity observed on the host.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    /// Mint a fresh, globally unique identity.
    #[must_use]
    pub fn mint() -> Self { Self(Uuid::now_v7().to_string()) }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Workspace partition key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WorkspaceKey {
    /// Tabs that carry no workspace id.
    #[default]
    Default,
    /// A user-defined workspace.
    Named(String),
}

impl WorkspaceKey {
    /// Creates a named workspace key.
    #[must_use]
    pub fn named(id: impl Into<String>) -> Self { Self::Named(id.into()) }

    /// Returns true for the default workspace.
    #[must_use]
    pub const fn is_default(&self) -> bool { matches!(self, Self::Default) }
}

impl fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Named(id) => f.write_str(id),
        }
    }
}

/// A tab's current stack membership.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackSlot {
    /// Not in any stack.
    #[default]
    Unstacked,
    /// Member of the given stack.
    Stacked(StackId),
}

impl StackSlot {
    /// Returns the stack identity, if any.
    #[must_use]
    pub const fn stack_id(&self) -> Option<&StackId> {
        match self {
            Self::Unstacked => None,
            Self::Stacked(id) => Some(id),
        }
    }

    /// Returns true if the slot holds exactly this identity.
    #[must_use]
    pub fn is(&self, id: &StackId) -> bool { self.stack_id() == Some(id) }
}

impl fmt::Display for StackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstacked => f.write_str(UNSTACKED_SENTINEL),
            Self::Stacked(id) => f.write_str(id.as_str()),
        }
    }
}

// ============================================================================
// Tab Types
// ============================================================================

/// Decoded tab as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    /// Host tab id.
    pub id: TabId,
    /// Current page URL.
    pub url: String,
    /// Pinned tabs are never grouped.
    pub pinned: bool,
    /// Side panel owning this tab, if any.
    pub panel_id: Option<String>,
    /// Workspace the tab lives in.
    pub workspace: WorkspaceKey,
    /// Current stack membership.
    pub stack: StackSlot,
    /// Position in the window's tab strip.
    pub index: usize,
}

impl Tab {
    /// Returns true if the tab belongs to a side panel.
    #[must_use]
    pub const fn is_panel(&self) -> bool { self.panel_id.is_some() }

    /// Returns true if the tab may take part in automatic stacking at all.
    ///
    /// Host rules are checked separately; this only covers the tab's own state.
    #[must_use]
    pub const fn is_stackable(&self) -> bool { !self.pinned && !self.is_panel() }
}

/// Tab as delivered by the host, with its metadata blob still encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    /// Host tab id (`-1` for invalid handles).
    pub id: TabId,
    /// Current page URL.
    pub url: String,
    /// Whether the tab is pinned.
    #[serde(default)]
    pub pinned: bool,
    /// Position in the window's tab strip.
    pub index: usize,
    /// JSON object holding `workspaceId`, `group`, `panelId` and anything else
    /// the host keeps there.
    #[serde(default)]
    pub ext_data: String,
}

impl TabRecord {
    /// Decodes the metadata blob into a typed [`Tab`].
    ///
    /// # Errors
    ///
    /// Returns [`AutostackError::MalformedMetadata`] if the blob is not a JSON
    /// object or one of the known fields has an unusable type.
    pub fn decode(&self) -> Result<Tab> {
        let meta = parse_ext_data(self.id, &self.ext_data)?;

        Ok(Tab {
            id: self.id,
            url: self.url.clone(),
            pinned: self.pinned,
            panel_id: decode_panel(meta.get(PANEL_FIELD)),
            workspace: decode_workspace(self.id, meta.get(WORKSPACE_FIELD))?,
            stack: decode_group(self.id, meta.get(GROUP_FIELD))?,
            index: self.index,
        })
    }

    /// Rewrites the blob so the tab belongs to `stack_id`.
    ///
    /// Only the group field changes; every other field is kept as-is.
    ///
    /// # Errors
    ///
    /// Returns [`AutostackError::MalformedMetadata`] if the current blob cannot be parsed.
    pub fn set_stack(&mut self, stack_id: &StackId) -> Result<()> {
        let mut meta = parse_ext_data(self.id, &self.ext_data)?;
        meta.insert(GROUP_FIELD.to_string(), Value::String(stack_id.as_str().to_string()));
        self.ext_data = Value::Object(meta).to_string();
        Ok(())
    }
}

fn parse_ext_data(tab_id: TabId, raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AutostackError::malformed(
            tab_id,
            format!("expected a JSON object, found {other}"),
        )),
        Err(err) => Err(AutostackError::malformed(tab_id, err.to_string())),
    }
}

fn decode_workspace(tab_id: TabId, value: Option<&Value>) -> Result<WorkspaceKey> {
    match value {
        None | Some(Value::Null) => Ok(WorkspaceKey::Default),
        Some(Value::Number(n)) => Ok(WorkspaceKey::Named(n.to_string())),
        Some(Value::String(s)) if s.is_empty() || s == UNSTACKED_SENTINEL => {
            Ok(WorkspaceKey::Default)
        }
        Some(Value::String(s)) => Ok(WorkspaceKey::Named(s.clone())),
        Some(other) => {
            Err(AutostackError::malformed(tab_id, format!("invalid workspaceId {other}")))
        }
    }
}

fn decode_group(tab_id: TabId, value: Option<&Value>) -> Result<StackSlot> {
    match value {
        None | Some(Value::Null) => Ok(StackSlot::Unstacked),
        Some(Value::String(s)) if s.is_empty() || s == UNSTACKED_SENTINEL => {
            Ok(StackSlot::Unstacked)
        }
        Some(Value::String(s)) => Ok(StackSlot::Stacked(StackId::new(s.clone()))),
        Some(other) => Err(AutostackError::malformed(tab_id, format!("invalid group {other}"))),
    }
}

/// Any truthy panel id marks the tab as a panel tab.
fn decode_panel(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
