//! Point-in-time view of the tab strip, partitioned for stacking.
//!
//! Tabs are nested as workspace → current stack → tabs. Every level keeps the
//! order in which it was first seen in the strip, so later passes visit
//! workspaces, stacks and tabs in strip order.
//!
//! Only stackable tabs enter the snapshot: records with an invalid handle or
//! an unreadable metadata blob, pinned tabs, panel tabs and tabs whose host
//! is not eligible are left out. The full strip order, every record included,
//! is kept alongside so moves can be planned against it.

use super::domain::{KeyResolver, UrlFragments};
use super::host::TabDirectory;
use super::rules::is_host_eligible;
use super::state::{StackSlot, Tab, TabId, TabRecord, WorkspaceKey};
use crate::config::StackingConfig;
use crate::error::Result;

/// A stackable tab with its decomposed URL and grouping key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotTab {
    pub tab: Tab,
    pub fragments: UrlFragments,
    pub key: String,
}

/// Tabs currently sharing one stack slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackGroup {
    pub slot: StackSlot,
    pub tabs: Vec<SnapshotTab>,
}

impl StackGroup {
    /// Returns the single grouping key shared by every tab, if they agree.
    #[must_use]
    pub fn unanimous_key(&self) -> Option<&str> {
        let (first, rest) = self.tabs.split_first()?;
        rest.iter().all(|entry| entry.key == first.key).then_some(first.key.as_str())
    }
}

/// All stack groups of one workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceTabs {
    pub workspace: WorkspaceKey,
    pub stacks: Vec<StackGroup>,
}

impl WorkspaceTabs {
    fn group_mut(&mut self, slot: &StackSlot) -> &mut StackGroup {
        let position = match self.stacks.iter().position(|group| &group.slot == slot) {
            Some(position) => position,
            None => {
                self.stacks.push(StackGroup { slot: slot.clone(), tabs: Vec::new() });
                self.stacks.len() - 1
            }
        };
        &mut self.stacks[position]
    }

    /// Iterates over every tab of the workspace, stack by stack.
    pub fn tabs(&self) -> impl Iterator<Item = &SnapshotTab> {
        self.stacks.iter().flat_map(|group| group.tabs.iter())
    }
}

/// Stackable tabs of the current window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabSnapshot {
    workspaces: Vec<WorkspaceTabs>,
    strip: Vec<TabId>,
}

impl TabSnapshot {
    /// Builds a snapshot from host records in strip order.
    #[must_use]
    pub fn from_records<I>(records: I, config: &StackingConfig, keys: &KeyResolver) -> Self
    where
        I: IntoIterator<Item = TabRecord>,
    {
        let mut records: Vec<TabRecord> = records.into_iter().collect();
        records.sort_by_key(|record| record.index);

        let mut snapshot = Self {
            workspaces: Vec::new(),
            strip: records.iter().map(|record| record.id).collect(),
        };

        for record in &records {
            if let Some(entry) = classify(record, config, keys) {
                snapshot.insert(entry);
            }
        }

        snapshot
    }

    fn insert(&mut self, entry: SnapshotTab) {
        let position =
            match self.workspaces.iter().position(|ws| ws.workspace == entry.tab.workspace) {
                Some(position) => position,
                None => {
                    self.workspaces.push(WorkspaceTabs {
                        workspace: entry.tab.workspace.clone(),
                        stacks: Vec::new(),
                    });
                    self.workspaces.len() - 1
                }
            };

        let slot = entry.tab.stack.clone();
        self.workspaces[position].group_mut(&slot).tabs.push(entry);
    }

    /// Returns the tabs of one workspace.
    #[must_use]
    pub fn workspace(&self, key: &WorkspaceKey) -> Option<&WorkspaceTabs> {
        self.workspaces.iter().find(|ws| &ws.workspace == key)
    }

    /// Returns all workspaces in discovery order.
    #[must_use]
    pub fn workspaces(&self) -> &[WorkspaceTabs] { &self.workspaces }

    /// Ids of every tab in the window, stackable or not, in strip order.
    #[must_use]
    pub fn strip(&self) -> &[TabId] { &self.strip }

    /// Total number of tabs in the snapshot.
    #[must_use]
    pub fn tab_count(&self) -> usize { self.workspaces.iter().map(|ws| ws.tabs().count()).sum() }
}

/// Lists the current window's tabs and builds a snapshot from them.
///
/// # Errors
///
/// Returns an error if the directory cannot list tabs.
pub async fn build_snapshot<D: TabDirectory>(
    directory: &D,
    config: &StackingConfig,
    keys: &KeyResolver,
) -> Result<TabSnapshot> {
    let records = directory.list_tabs().await?;
    let total = records.len();
    let snapshot = TabSnapshot::from_records(records, config, keys);

    tracing::trace!(
        "stacking: snapshot holds {} of {total} tabs in {} workspaces",
        snapshot.tab_count(),
        snapshot.workspaces().len()
    );

    Ok(snapshot)
}

fn classify(record: &TabRecord, config: &StackingConfig, keys: &KeyResolver) -> Option<SnapshotTab> {
    if !record.id.is_valid() {
        return None;
    }

    let tab = match record.decode() {
        Ok(tab) => tab,
        Err(err) => {
            tracing::warn!("stacking: skipping tab {}: {err}", record.id);
            return None;
        }
    };

    if !tab.is_stackable() {
        return None;
    }

    let fragments = keys.fragments(&tab.url)?;
    if !is_host_eligible(config, &fragments.host) {
        return None;
    }

    let key = keys.key_for(&fragments);
    Some(SnapshotTab { tab, fragments, key })
}
