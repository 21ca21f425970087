//! Stacking commands and their executor.
//!
//! A pass never mutates the host while it is deciding what to do. It emits a
//! list of [`StackCommand`]s, and [`CommandExecutor`] applies them afterwards.
//!
//! ```text
//! snapshot ──► plan ──► Vec<StackCommand> ──► CommandExecutor ──► host
//! ```
//!
//! Commands are issued strictly in order: each `MoveTab` index assumes the
//! moves before it have already happened. The executor does not wait for or
//! check that they have; every move is sent as planned. A label the stack
//! already has is not written again. A failing command is logged and counted;
//! the rest of the list still runs.

use serde::Serialize;

use super::constants::STACK_NAME_MAP_KEY;
use super::host::{NameStore, TabDirectory};
use super::namer::merge_label;
use super::state::{StackId, TabId};
use crate::error::Result;

// ============================================================================
// Command Types
// ============================================================================

/// A single mutation requested from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StackCommand {
    /// Store `label` as the display name of `stack_id`.
    RenameStack {
        stack_id: StackId,
        label: String,
    },

    /// Make `tab_id` a member of `stack_id`.
    AssignStack {
        tab_id: TabId,
        stack_id: StackId,
    },

    /// Move `tab_id` to `index` in the strip.
    MoveTab {
        tab_id: TabId,
        index: usize,
    },
}

impl StackCommand {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RenameStack { .. } => "rename",
            Self::AssignStack { .. } => "assign",
            Self::MoveTab { .. } => "move",
        }
    }
}

/// Outcome of applying one command list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    /// Commands the host accepted.
    pub applied: usize,
    /// Renames skipped because the stack already had the label.
    pub unchanged: usize,
    /// Commands the host rejected.
    pub failed: usize,
    /// The commands, in issue order.
    pub commands: Vec<StackCommand>,
}

impl PassReport {
    /// Returns true if the pass issued no commands.
    #[must_use]
    pub fn is_noop(&self) -> bool { self.commands.is_empty() }

    /// Returns true if no command changed the host.
    #[must_use]
    pub const fn is_converged(&self) -> bool { self.applied == 0 && self.failed == 0 }

    /// Number of stack assignments issued.
    #[must_use]
    pub fn assignments(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, StackCommand::AssignStack { .. })).count()
    }

    /// Number of moves issued.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, StackCommand::MoveTab { .. })).count()
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Applies commands through the host collaborators.
#[derive(Debug)]
pub struct CommandExecutor<'a, D, N> {
    directory: &'a D,
    names: &'a N,
}

impl<'a, D: TabDirectory, N: NameStore> CommandExecutor<'a, D, N> {
    #[must_use]
    pub const fn new(directory: &'a D, names: &'a N) -> Self { Self { directory, names } }

    /// Applies every command in order.
    pub async fn execute(&self, commands: Vec<StackCommand>) -> PassReport {
        let mut report = PassReport::default();

        for command in &commands {
            match self.apply(command).await {
                Ok(Outcome::Applied) => report.applied += 1,
                Ok(Outcome::Unchanged) => report.unchanged += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!("stacking: {} command failed: {err}", command.name());
                }
            }
        }

        report.commands = commands;
        report
    }

    async fn apply(&self, command: &StackCommand) -> Result<Outcome> {
        match command {
            StackCommand::RenameStack { stack_id, label } => {
                self.rename_stack(stack_id, label).await
            }
            StackCommand::AssignStack { tab_id, stack_id } => {
                tracing::trace!("stacking: assigning tab {tab_id} to stack {stack_id}");
                self.directory.set_tab_stack(*tab_id, stack_id).await?;
                Ok(Outcome::Applied)
            }
            StackCommand::MoveTab { tab_id, index } => {
                self.directory.move_tab(*tab_id, *index).await?;
                Ok(Outcome::Applied)
            }
        }
    }

    /// Read-merge-write of the label map.
    async fn rename_stack(&self, stack_id: &StackId, label: &str) -> Result<Outcome> {
        let mut names = self.names.get_names(STACK_NAME_MAP_KEY).await?;
        if !merge_label(&mut names, stack_id, label) {
            return Ok(Outcome::Unchanged);
        }

        tracing::debug!("stacking: naming stack {stack_id} \"{label}\"");
        self.names.set_names(STACK_NAME_MAP_KEY, names).await?;
        Ok(Outcome::Applied)
    }
}

enum Outcome {
    Applied,
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{Future, ready};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use crate::stacking::host::{MemoryNameStore, MemoryTabDirectory};
    use crate::stacking::state::TabRecord;

    /// Records requests and never reports any tab state.
    #[derive(Default)]
    struct RecordingDirectory {
        reads: AtomicUsize,
        moves: Mutex<Vec<(TabId, usize)>>,
    }

    impl TabDirectory for RecordingDirectory {
        fn list_tabs(&self) -> impl Future<Output = Result<Vec<TabRecord>>> + Send {
            self.reads.fetch_add(1, Ordering::SeqCst);
            ready(Ok(Vec::new()))
        }

        fn get_tab(&self, _id: TabId) -> impl Future<Output = Result<Option<TabRecord>>> + Send {
            self.reads.fetch_add(1, Ordering::SeqCst);
            ready(Ok(None))
        }

        fn move_tab(&self, id: TabId, index: usize) -> impl Future<Output = Result<()>> + Send {
            self.moves.lock().push((id, index));
            ready(Ok(()))
        }

        fn set_tab_stack(
            &self,
            _id: TabId,
            _stack_id: &StackId,
        ) -> impl Future<Output = Result<()>> + Send {
            ready(Ok(()))
        }
    }

    fn make_directory(count: i64) -> MemoryTabDirectory {
        MemoryTabDirectory::new(
            (0..count)
                .map(|i| TabRecord {
                    id: TabId::new(i),
                    url: "https://example.com".to_string(),
                    pinned: false,
                    index: i as usize,
                    ext_data: String::new(),
                })
                .collect(),
        )
    }

    // ========================================================================
    // Command tests
    // ========================================================================

    #[test]
    fn test_command_serializes_tagged() {
        let command = StackCommand::MoveTab { tab_id: TabId::new(3), index: 1 };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "moveTab", "tabId": 3, "index": 1 }));
    }

    #[test]
    fn test_report_counts() {
        let report = PassReport {
            applied: 3,
            unchanged: 0,
            failed: 0,
            commands: vec![
                StackCommand::AssignStack { tab_id: TabId::new(1), stack_id: StackId::new("s") },
                StackCommand::MoveTab { tab_id: TabId::new(1), index: 0 },
                StackCommand::MoveTab { tab_id: TabId::new(2), index: 1 },
            ],
        };
        assert_eq!(report.assignments(), 1);
        assert_eq!(report.moves(), 2);
        assert!(!report.is_noop());
        assert!(!report.is_converged());
        assert!(PassReport::default().is_noop());
    }

    // ========================================================================
    // Executor tests
    // ========================================================================

    #[tokio::test]
    async fn test_execute_applies_in_order() {
        let directory = make_directory(3);
        let names = MemoryNameStore::new();
        let executor = CommandExecutor::new(&directory, &names);

        let report = executor
            .execute(vec![
                StackCommand::MoveTab { tab_id: TabId::new(2), index: 0 },
                StackCommand::MoveTab { tab_id: TabId::new(1), index: 0 },
            ])
            .await;

        assert_eq!(report.applied, 2);
        assert_eq!(directory.order(), vec![TabId::new(1), TabId::new(2), TabId::new(0)]);
    }

    #[tokio::test]
    async fn test_moves_are_sent_without_reading_back() {
        let directory = RecordingDirectory::default();
        let names = MemoryNameStore::new();
        let executor = CommandExecutor::new(&directory, &names);

        let report = executor
            .execute(vec![
                StackCommand::MoveTab { tab_id: TabId::new(0), index: 0 },
                StackCommand::MoveTab { tab_id: TabId::new(1), index: 1 },
            ])
            .await;

        assert_eq!(report.applied, 2);
        assert_eq!(report.unchanged, 0);
        assert_eq!(directory.reads.load(Ordering::SeqCst), 0);
        assert_eq!(*directory.moves.lock(), vec![(TabId::new(0), 0), (TabId::new(1), 1)]);
    }

    #[tokio::test]
    async fn test_rename_to_same_label_is_unchanged() {
        let directory = make_directory(0);
        let mut existing = crate::stacking::host::StackNames::new();
        existing.insert(StackId::new("s1"), "Example".to_string());
        let names = MemoryNameStore::with_names(STACK_NAME_MAP_KEY, existing);
        let executor = CommandExecutor::new(&directory, &names);

        let report = executor
            .execute(vec![StackCommand::RenameStack {
                stack_id: StackId::new("s1"),
                label: "Example".to_string(),
            }])
            .await;

        assert_eq!(report.unchanged, 1);
        assert!(report.is_converged());
    }

    #[tokio::test]
    async fn test_execute_continues_after_failure() {
        let directory = make_directory(2);
        let names = MemoryNameStore::new();
        let executor = CommandExecutor::new(&directory, &names);

        let report = executor
            .execute(vec![
                StackCommand::AssignStack { tab_id: TabId::new(9), stack_id: StackId::new("s") },
                StackCommand::AssignStack { tab_id: TabId::new(1), stack_id: StackId::new("s") },
            ])
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.applied, 1);
        let tab = directory.record(TabId::new(1)).unwrap().decode().unwrap();
        assert!(tab.stack.is(&StackId::new("s")));
    }

    #[tokio::test]
    async fn test_rename_merges_into_existing_map() {
        let directory = make_directory(0);
        let mut existing = crate::stacking::host::StackNames::new();
        existing.insert(StackId::new("keep"), "Keep".to_string());
        let names = MemoryNameStore::with_names(STACK_NAME_MAP_KEY, existing);
        let executor = CommandExecutor::new(&directory, &names);

        let report = executor
            .execute(vec![StackCommand::RenameStack {
                stack_id: StackId::new("s1"),
                label: "Example".to_string(),
            }])
            .await;

        assert_eq!(report.applied, 1);
        let stored = names.names(STACK_NAME_MAP_KEY);
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[&StackId::new("s1")], "Example");
        assert_eq!(stored[&StackId::new("keep")], "Keep");
    }
}
