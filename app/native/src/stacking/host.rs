//! Host platform collaborators.
//!
//! The engine never talks to a browser directly. It reads tab state and
//! requests mutations through [`TabDirectory`], and reads/writes stack labels
//! through [`NameStore`]. Requests are issued in order; a returned future only
//! means the host accepted the request.
//!
//! [`MemoryTabDirectory`] and [`MemoryNameStore`] implement both traits over
//! plain in-process state. They back the replay CLI and the tests.

use std::collections::{BTreeMap, HashMap};
use std::future::{Future, ready};

use parking_lot::RwLock;

use super::state::{StackId, TabId, TabRecord};
use crate::error::{AutostackError, Result};

/// Stack labels keyed by stack identity.
pub type StackNames = BTreeMap<StackId, String>;

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Read and mutate the tabs of the current window.
pub trait TabDirectory: Send + Sync {
    /// Lists all tabs of the current window in strip order.
    fn list_tabs(&self) -> impl Future<Output = Result<Vec<TabRecord>>> + Send;

    /// Looks up a single tab. `Ok(None)` means the tab is gone.
    fn get_tab(&self, id: TabId) -> impl Future<Output = Result<Option<TabRecord>>> + Send;

    /// Moves a tab to `index` in the strip.
    fn move_tab(&self, id: TabId, index: usize) -> impl Future<Output = Result<()>> + Send;

    /// Makes the tab a member of `stack_id`.
    fn set_tab_stack(
        &self,
        id: TabId,
        stack_id: &StackId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Preference store holding stack labels.
pub trait NameStore: Send + Sync {
    /// Reads the label map stored under `key`. A missing entry is an empty map.
    fn get_names(&self, key: &str) -> impl Future<Output = Result<StackNames>> + Send;

    /// Replaces the label map stored under `key`.
    fn set_names(&self, key: &str, names: StackNames) -> impl Future<Output = Result<()>> + Send;
}

// ============================================================================
// In-memory Tab Directory
// ============================================================================

/// Tab strip kept in memory.
///
/// Moves behave like a browser tab strip: the tab is removed and re-inserted
/// at the requested index (clamped to the end), and every tab's `index` is
/// renumbered afterwards.
#[derive(Debug, Default)]
pub struct MemoryTabDirectory {
    tabs: RwLock<Vec<TabRecord>>,
}

impl MemoryTabDirectory {
    /// Creates a directory from records, ordered by their `index`.
    #[must_use]
    pub fn new(mut records: Vec<TabRecord>) -> Self {
        records.sort_by_key(|record| record.index);
        renumber(&mut records);
        Self { tabs: RwLock::new(records) }
    }

    /// Returns a copy of all records in strip order.
    #[must_use]
    pub fn records(&self) -> Vec<TabRecord> { self.tabs.read().clone() }

    /// Returns a copy of one record.
    #[must_use]
    pub fn record(&self, id: TabId) -> Option<TabRecord> {
        self.tabs.read().iter().find(|record| record.id == id).cloned()
    }

    /// Returns tab ids in strip order.
    #[must_use]
    pub fn order(&self) -> Vec<TabId> { self.tabs.read().iter().map(|record| record.id).collect() }

    /// Replaces a tab's URL, as a navigation would.
    ///
    /// Returns false if the tab does not exist.
    pub fn navigate(&self, id: TabId, url: impl Into<String>) -> bool {
        let mut tabs = self.tabs.write();
        let Some(record) = tabs.iter_mut().find(|record| record.id == id) else {
            return false;
        };
        record.url = url.into();
        true
    }

    /// Removes a tab, as closing it would.
    pub fn close(&self, id: TabId) -> Option<TabRecord> {
        let mut tabs = self.tabs.write();
        let position = tabs.iter().position(|record| record.id == id)?;
        let removed = tabs.remove(position);
        renumber(&mut tabs);
        Some(removed)
    }

    fn apply_move(&self, id: TabId, index: usize) -> Result<()> {
        let mut tabs = self.tabs.write();
        let from = tabs
            .iter()
            .position(|record| record.id == id)
            .ok_or(AutostackError::TabNotFound(id))?;

        let record = tabs.remove(from);
        let to = index.min(tabs.len());
        tabs.insert(to, record);
        renumber(&mut tabs);
        Ok(())
    }

    fn apply_stack(&self, id: TabId, stack_id: &StackId) -> Result<()> {
        let mut tabs = self.tabs.write();
        let record = tabs
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(AutostackError::TabNotFound(id))?;
        record.set_stack(stack_id)
    }
}

fn renumber(tabs: &mut [TabRecord]) {
    for (index, record) in tabs.iter_mut().enumerate() {
        record.index = index;
    }
}

impl TabDirectory for MemoryTabDirectory {
    fn list_tabs(&self) -> impl Future<Output = Result<Vec<TabRecord>>> + Send {
        ready(Ok(self.records()))
    }

    fn get_tab(&self, id: TabId) -> impl Future<Output = Result<Option<TabRecord>>> + Send {
        ready(Ok(self.record(id)))
    }

    fn move_tab(&self, id: TabId, index: usize) -> impl Future<Output = Result<()>> + Send {
        ready(self.apply_move(id, index))
    }

    fn set_tab_stack(
        &self,
        id: TabId,
        stack_id: &StackId,
    ) -> impl Future<Output = Result<()>> + Send {
        ready(self.apply_stack(id, stack_id))
    }
}

// ============================================================================
// In-memory Name Store
// ============================================================================

/// Name store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryNameStore {
    entries: RwLock<HashMap<String, StackNames>>,
}

impl MemoryNameStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a store with an initial label map under `key`.
    #[must_use]
    pub fn with_names(key: &str, names: StackNames) -> Self {
        let store = Self::new();
        store.entries.write().insert(key.to_string(), names);
        store
    }

    /// Returns a copy of the label map under `key`.
    #[must_use]
    pub fn names(&self, key: &str) -> StackNames {
        self.entries.read().get(key).cloned().unwrap_or_default()
    }
}

impl NameStore for MemoryNameStore {
    fn get_names(&self, key: &str) -> impl Future<Output = Result<StackNames>> + Send {
        ready(Ok(self.names(key)))
    }

    fn set_names(&self, key: &str, names: StackNames) -> impl Future<Output = Result<()>> + Send {
        self.entries.write().insert(key.to_string(), names);
        ready(Ok(()))
    }
}
