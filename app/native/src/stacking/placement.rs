//! Stack placement.
//!
//! A pass is triggered by one *target* tab and only reshapes the stack whose
//! grouping key matches the target's, inside the target's workspace:
//!
//! 1. Snapshot the window and collect claimed identities for every key.
//! 2. Bucket the workspace's tabs by resolved identity, minting identities
//!    for keys nobody claims yet.
//! 3. For the target's bucket, read the live index of its first tab (the
//!    *anchor*), then assign every member to the bucket's stack and move it
//!    to `anchor`, `anchor + 1`, ... in bucket order.
//!
//! Moves are replayed on a [`PlannedStrip`] copy of the snapshot's order while
//! planning. A move is left out only when that copy already has the tab at
//! its target. The host is never re-read between commands, since an accepted
//! move may not have landed yet.
//!
//! Running a pass twice without intervening changes plans no assignments and
//! no moves the second time.

use std::sync::Arc;

use super::commands::{CommandExecutor, PassReport, StackCommand};
use super::domain::KeyResolver;
use super::host::{NameStore, TabDirectory};
use super::namer::stack_label;
use super::resolver::KeyIdentityMap;
use super::snapshot::{WorkspaceTabs, build_snapshot};
use super::state::{StackId, StackSlot, Tab, TabId};
use crate::config::StackingConfig;
use crate::error::Result;

// ============================================================================
// Buckets
// ============================================================================

/// A tab scheduled for a bucket, with the stack it is in right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketMember {
    pub tab_id: TabId,
    pub current: StackSlot,
}

/// Tabs of one workspace that resolve to the same stack identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub stack_id: StackId,
    pub key: String,
    pub members: Vec<BucketMember>,
}

impl Bucket {
    /// The first member; its live position anchors the whole bucket.
    #[must_use]
    pub fn anchor_tab(&self) -> Option<TabId> { self.members.first().map(|m| m.tab_id) }

    /// Commands that gather the bucket at `anchor`.
    ///
    /// Members already in the right stack get no assignment. Every move is
    /// applied to `strip`, and moves that leave it unchanged are dropped.
    #[must_use]
    pub fn commands(&self, anchor: usize, strip: &mut PlannedStrip) -> Vec<StackCommand> {
        let mut commands = Vec::with_capacity(self.members.len() * 2);

        for (offset, member) in self.members.iter().enumerate() {
            if !member.current.is(&self.stack_id) {
                commands.push(StackCommand::AssignStack {
                    tab_id: member.tab_id,
                    stack_id: self.stack_id.clone(),
                });
            }

            let index = anchor + offset;
            if strip.apply_move(member.tab_id, index) {
                commands.push(StackCommand::MoveTab { tab_id: member.tab_id, index });
            }
        }

        commands
    }
}

/// Strip order as the host will have it once every planned move has landed.
///
/// Moves follow the host's rule: the tab is taken out, then re-inserted at
/// `index` clamped to the end of the strip. Tabs it does not know about are
/// always moved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlannedStrip {
    tabs: Vec<TabId>,
}

impl PlannedStrip {
    #[must_use]
    pub fn new(tabs: impl Into<Vec<TabId>>) -> Self { Self { tabs: tabs.into() } }

    /// Position of a tab in the planned order.
    #[must_use]
    pub fn position(&self, id: TabId) -> Option<usize> { self.tabs.iter().position(|t| *t == id) }

    /// The planned order.
    #[must_use]
    pub fn tabs(&self) -> &[TabId] { &self.tabs }

    /// Records a move and returns whether it changes anything.
    pub fn apply_move(&mut self, id: TabId, index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return true;
        };

        let to = index.min(self.tabs.len() - 1);
        if from == to {
            return false;
        }

        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        true
    }
}

/// Groups a workspace's tabs by resolved stack identity.
///
/// Buckets appear in the order their first tab is visited (stack by stack,
/// then strip order within a stack). Identities minted here are recorded in
/// `identities` so later tabs with the same key join the same bucket.
#[must_use]
pub fn plan_buckets(workspace: &WorkspaceTabs, identities: &mut KeyIdentityMap) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for entry in workspace.tabs() {
        let stack_id = identities.resolve_or_mint(&workspace.workspace, &entry.key);
        let member = BucketMember { tab_id: entry.tab.id, current: entry.tab.stack.clone() };

        match buckets.iter_mut().find(|bucket| bucket.stack_id == stack_id) {
            Some(bucket) => bucket.members.push(member),
            None => buckets.push(Bucket { stack_id, key: entry.key.clone(), members: vec![member] }),
        }
    }

    buckets
}

// ============================================================================
// Placement Engine
// ============================================================================

/// Runs stacking passes against a host.
pub struct PlacementEngine<D, N> {
    config: Arc<StackingConfig>,
    keys: KeyResolver,
    directory: Arc<D>,
    names: Arc<N>,
}

impl<D, N> std::fmt::Debug for PlacementEngine<D, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementEngine")
            .field("config", &self.config)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl<D: TabDirectory, N: NameStore> PlacementEngine<D, N> {
    /// Creates an engine with the default key resolver for `config`.
    #[must_use]
    pub fn new(config: Arc<StackingConfig>, directory: Arc<D>, names: Arc<N>) -> Self {
        let keys = KeyResolver::from_config(&config);
        Self::with_keys(config, keys, directory, names)
    }

    /// Creates an engine with a custom key resolver.
    #[must_use]
    pub const fn with_keys(
        config: Arc<StackingConfig>,
        keys: KeyResolver,
        directory: Arc<D>,
        names: Arc<N>,
    ) -> Self {
        Self { config, keys, directory, names }
    }

    #[must_use]
    pub fn config(&self) -> &StackingConfig { &self.config }

    #[must_use]
    pub const fn keys(&self) -> &KeyResolver { &self.keys }

    #[must_use]
    pub fn directory(&self) -> &D { &self.directory }

    /// Computes the commands of one pass without applying them.
    ///
    /// Returns an empty list when there is nothing to do: the target's
    /// workspace is skipped, its URL has no host, or its anchor is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the window's tabs cannot be listed.
    pub async fn plan_pass(&self, target: &Tab) -> Result<Vec<StackCommand>> {
        if !self.config.apply_in_non_default_workspace && !target.workspace.is_default() {
            tracing::trace!("stacking: skipping non-default workspace {}", target.workspace);
            return Ok(Vec::new());
        }

        let Some(fragments) = self.keys.fragments(&target.url) else {
            tracing::trace!("stacking: tab {} has no host", target.id);
            return Ok(Vec::new());
        };
        let target_key = self.keys.key_for(&fragments);

        let snapshot = build_snapshot(self.directory.as_ref(), &self.config, &self.keys).await?;
        let mut identities = KeyIdentityMap::from_snapshot(&snapshot);

        let Some(workspace) = snapshot.workspace(&target.workspace) else {
            return Ok(Vec::new());
        };

        let Some(bucket) = plan_buckets(workspace, &mut identities)
            .into_iter()
            .find(|bucket| bucket.key == target_key)
        else {
            tracing::trace!("stacking: no eligible tabs for {target_key}");
            return Ok(Vec::new());
        };

        let Some(anchor) = self.anchor_index(&bucket).await else {
            return Ok(Vec::new());
        };

        let mut strip = PlannedStrip::new(snapshot.strip());
        if bucket.anchor_tab().and_then(|id| strip.position(id)) != Some(anchor) {
            tracing::debug!("stacking: strip changed since the snapshot, moving every member");
            strip = PlannedStrip::default();
        }

        let mut commands = Vec::new();
        if self.config.naming_mode.is_enabled()
            && let Some(label) = stack_label(self.config.naming_mode, &target_key, &fragments)
        {
            commands.push(StackCommand::RenameStack { stack_id: bucket.stack_id.clone(), label });
        }
        commands.extend(bucket.commands(anchor, &mut strip));
        tracing::trace!("stacking: planned strip {:?}", strip.tabs());

        tracing::debug!(
            "stacking: gathering {} tabs of {target_key} into {} at index {anchor}",
            bucket.members.len(),
            bucket.stack_id
        );

        Ok(commands)
    }

    /// Plans and applies one pass for `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails. Individual command failures are
    /// counted in the report instead.
    pub async fn run_pass(&self, target: &Tab) -> Result<PassReport> {
        let commands = self.plan_pass(target).await?;
        if commands.is_empty() {
            return Ok(PassReport::default());
        }

        let report =
            CommandExecutor::new(self.directory.as_ref(), self.names.as_ref()).execute(commands).await;

        tracing::debug!(
            "stacking: pass for tab {} applied {} commands ({} failed)",
            target.id,
            report.applied,
            report.failed
        );

        Ok(report)
    }

    /// Reads the anchor's current position from the host.
    async fn anchor_index(&self, bucket: &Bucket) -> Option<usize> {
        let anchor = bucket.anchor_tab()?;

        match self.directory.get_tab(anchor).await {
            Ok(Some(record)) if record.id.is_valid() => Some(record.index),
            Ok(_) => {
                tracing::debug!("stacking: anchor tab {anchor} is gone, skipping pass");
                None
            }
            Err(err) => {
                tracing::debug!("stacking: anchor tab {anchor} unavailable: {err}");
                None
            }
        }
    }
}
