//! Grouping key → stack identity resolution.
//!
//! A stack is *claimed* by a grouping key when it is a real stack and every
//! tab in it shares that key. Several stacks may claim the same key (for
//! instance after the user split one); the smallest identity then wins, so
//! repeated passes converge on the same stack.

use std::collections::HashMap;

use smallvec::SmallVec;

use super::snapshot::TabSnapshot;
use super::state::{StackId, WorkspaceKey};

/// Identities claiming one key, in discovery order.
pub type IdentitySet = SmallVec<[StackId; 2]>;

/// Per-workspace map from grouping key to the stacks that claim it.
#[derive(Clone, Debug, Default)]
pub struct KeyIdentityMap {
    workspaces: HashMap<WorkspaceKey, HashMap<String, IdentitySet>>,
}

impl KeyIdentityMap {
    /// Collects the identities claimed by unanimous stacks of every workspace.
    #[must_use]
    pub fn from_snapshot(snapshot: &TabSnapshot) -> Self {
        let mut map = Self::default();

        for workspace in snapshot.workspaces() {
            for group in &workspace.stacks {
                let Some(stack_id) = group.slot.stack_id() else { continue };
                let Some(key) = group.unanimous_key() else { continue };
                map.claim(&workspace.workspace, key, stack_id.clone());
            }
        }

        map
    }

    /// Records that `stack_id` claims `key` in `workspace`.
    pub fn claim(&mut self, workspace: &WorkspaceKey, key: &str, stack_id: StackId) {
        let identities =
            self.workspaces.entry(workspace.clone()).or_default().entry(key.to_string()).or_default();
        if !identities.contains(&stack_id) {
            identities.push(stack_id);
        }
    }

    /// Returns every identity claiming `key`, in discovery order.
    #[must_use]
    pub fn identities(&self, workspace: &WorkspaceKey, key: &str) -> &[StackId] {
        self.workspaces
            .get(workspace)
            .and_then(|keys| keys.get(key))
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the winning identity for `key`: the smallest one.
    #[must_use]
    pub fn resolve(&self, workspace: &WorkspaceKey, key: &str) -> Option<&StackId> {
        self.identities(workspace, key).iter().min()
    }

    /// Resolves `key`, minting and recording a fresh identity when none exists.
    pub fn resolve_or_mint(&mut self, workspace: &WorkspaceKey, key: &str) -> StackId {
        self.resolve_or_mint_with(workspace, key, StackId::mint)
    }

    /// Like [`Self::resolve_or_mint`] with a custom identity source.
    pub fn resolve_or_mint_with<F>(&mut self, workspace: &WorkspaceKey, key: &str, mint: F) -> StackId
    where
        F: FnOnce() -> StackId,
    {
        if let Some(existing) = self.resolve(workspace, key) {
            return existing.clone();
        }

        let minted = mint();
        tracing::debug!("stacking: minted stack {minted} for {key} in workspace {workspace}");
        self.claim(workspace, key, minted.clone());
        minted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackingConfig;
    use crate::stacking::domain::KeyResolver;
    use crate::stacking::state::{TabId, TabRecord};

    fn make_record(id: i64, url: &str, ext_data: &str) -> TabRecord {
        TabRecord {
            id: TabId::new(id),
            url: url.to_string(),
            pinned: false,
            index: 0,
            ext_data: ext_data.to_string(),
        }
    }

    fn map_of(records: Vec<TabRecord>) -> KeyIdentityMap {
        let config = StackingConfig::default();
        let snapshot =
            TabSnapshot::from_records(records, &config, &KeyResolver::from_config(&config));
        KeyIdentityMap::from_snapshot(&snapshot)
    }

    // ========================================================================
    // Claim tests
    // ========================================================================

    #[test]
    fn test_only_unanimous_real_stacks_claim() {
        let map = map_of(vec![
            make_record(1, "https://a.com", r#"{"group": "s1"}"#),
            make_record(2, "https://a.com", r#"{"group": "s1"}"#),
            make_record(3, "https://a.com", r#"{"group": "mixed"}"#),
            make_record(4, "https://b.com", r#"{"group": "mixed"}"#),
            make_record(5, "https://c.com", ""),
        ]);

        let ws = WorkspaceKey::Default;
        assert_eq!(map.identities(&ws, "a.com"), &[StackId::new("s1")]);
        assert!(map.identities(&ws, "b.com").is_empty());
        assert!(map.identities(&ws, "c.com").is_empty());
    }

    #[test]
    fn test_collision_resolves_to_smallest_identity() {
        let map = map_of(vec![
            make_record(1, "https://x.com", r#"{"group": "b-id"}"#),
            make_record(2, "https://x.com", r#"{"group": "a-id"}"#),
        ]);

        let ws = WorkspaceKey::Default;
        assert_eq!(map.identities(&ws, "x.com"), &[StackId::new("b-id"), StackId::new("a-id")]);
        assert_eq!(map.resolve(&ws, "x.com"), Some(&StackId::new("a-id")));
    }

    #[test]
    fn test_workspaces_do_not_share_identities() {
        let map = map_of(vec![
            make_record(1, "https://x.com", r#"{"workspaceId": 1, "group": "s1"}"#),
            make_record(2, "https://x.com", r#"{"workspaceId": 2}"#),
        ]);

        assert!(map.resolve(&WorkspaceKey::named("1"), "x.com").is_some());
        assert!(map.resolve(&WorkspaceKey::named("2"), "x.com").is_none());
    }

    // ========================================================================
    // Minting tests
    // ========================================================================

    #[test]
    fn test_mint_is_recorded_and_reused() {
        let mut map = KeyIdentityMap::default();
        let ws = WorkspaceKey::Default;

        let first = map.resolve_or_mint_with(&ws, "a.com", || StackId::new("fresh"));
        let second = map.resolve_or_mint_with(&ws, "a.com", || StackId::new("other"));

        assert_eq!(first, StackId::new("fresh"));
        assert_eq!(second, first);
    }

    #[test]
    fn test_existing_identity_is_not_replaced() {
        let mut map = KeyIdentityMap::default();
        let ws = WorkspaceKey::Default;
        map.claim(&ws, "a.com", StackId::new("kept"));
        map.claim(&ws, "a.com", StackId::new("kept"));

        assert_eq!(map.identities(&ws, "a.com").len(), 1);
        assert_eq!(map.resolve_or_mint(&ws, "a.com"), StackId::new("kept"));
    }
}
