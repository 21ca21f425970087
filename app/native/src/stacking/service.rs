//! Navigation trigger service.
//!
//! Every committed top-level navigation schedules one pass for its tab:
//!
//! ```text
//! NavigationEvent ──► StackingHandle ──► service loop
//!                                            │ re-read tab, filter
//!                                            ▼
//!                                   spawned task: sleep(settle delay)
//!                                            │
//!                                            ▼
//!                                   PlacementEngine::run_pass
//! ```
//!
//! The target tab is read when the event arrives; the pass after the delay
//! works with that reading. Events are not coalesced, so two navigations in
//! quick succession produce two passes.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::commands::PassReport;
use super::constants::CHANNEL_BUFFER_SIZE;
use super::host::{NameStore, TabDirectory};
use super::placement::PlacementEngine;
use super::state::{Tab, TabId};

// ============================================================================
// Events
// ============================================================================

/// Which frame of a tab committed a navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    /// The tab's top-level document.
    OutermostFrame,
    /// An iframe.
    SubFrame,
    /// A fenced frame.
    FencedFrame,
}

/// A navigation commit reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub frame_type: FrameType,
}

impl NavigationEvent {
    /// A top-level navigation of `tab_id`.
    #[must_use]
    pub const fn top_level(tab_id: TabId) -> Self {
        Self { tab_id, frame_type: FrameType::OutermostFrame }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Errors from pushing events to the service.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The service loop has stopped.
    #[error("Failed to send navigation event: service stopped")]
    Closed,

    /// The event buffer is full.
    #[error("Failed to send navigation event: buffer full")]
    Full,
}

/// Cloneable handle feeding navigation events to a running service.
#[derive(Clone, Debug)]
pub struct StackingHandle {
    sender: mpsc::Sender<NavigationEvent>,
}

impl StackingHandle {
    /// Queues an event without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::Full`] if the buffer is full or
    /// [`TriggerError::Closed`] if the service has stopped.
    pub fn notify(&self, event: NavigationEvent) -> Result<(), TriggerError> {
        self.sender.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => TriggerError::Full,
            mpsc::error::TrySendError::Closed(_) => TriggerError::Closed,
        })
    }

    /// Queues an event, waiting for buffer space.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::Closed`] if the service has stopped.
    pub async fn notify_async(&self, event: NavigationEvent) -> Result<(), TriggerError> {
        self.sender.send(event).await.map_err(|_| TriggerError::Closed)
    }

    /// Returns true once the service loop has exited.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }
}

// ============================================================================
// Service
// ============================================================================

/// Turns navigation events into delayed stacking passes.
pub struct StackingService<D, N> {
    engine: Arc<PlacementEngine<D, N>>,
    settle_delay: Duration,
}

impl<D, N> Clone for StackingService<D, N> {
    fn clone(&self) -> Self {
        Self { engine: Arc::clone(&self.engine), settle_delay: self.settle_delay }
    }
}

impl<D, N> StackingService<D, N>
where
    D: TabDirectory + 'static,
    N: NameStore + 'static,
{
    /// Creates a service using the engine's configured settle delay.
    #[must_use]
    pub fn new(engine: PlacementEngine<D, N>) -> Self {
        let settle_delay = Duration::from_millis(engine.config().settle_delay_ms);
        Self { engine: Arc::new(engine), settle_delay }
    }

    /// Overrides the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &PlacementEngine<D, N> { &self.engine }

    /// Reads the event's tab and decides whether it triggers a pass.
    pub async fn accept(&self, event: NavigationEvent) -> Option<Tab> {
        if event.frame_type != FrameType::OutermostFrame || !event.tab_id.is_valid() {
            return None;
        }

        let record = match self.engine.directory().get_tab(event.tab_id).await {
            Ok(Some(record)) if record.id.is_valid() => record,
            Ok(_) => return None,
            Err(err) => {
                tracing::debug!("stacking: cannot read tab {}: {err}", event.tab_id);
                return None;
            }
        };

        match record.decode() {
            Ok(tab) if tab.is_stackable() => Some(tab),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("stacking: ignoring navigation in tab {}: {err}", event.tab_id);
                None
            }
        }
    }

    /// Handles one navigation commit.
    ///
    /// The returned task resolves to the pass report, or `None` when the
    /// event was ignored or the pass could not be planned.
    pub fn on_navigation_committed(&self, event: NavigationEvent) -> JoinHandle<Option<PassReport>> {
        let service = self.clone();

        tokio::spawn(async move {
            let target = service.accept(event).await?;
            tokio::time::sleep(service.settle_delay).await;

            match service.engine.run_pass(&target).await {
                Ok(report) => Some(report),
                Err(err) => {
                    tracing::warn!("stacking: pass for tab {} failed: {err}", target.id);
                    None
                }
            }
        })
    }

    /// Starts the event loop and returns a handle to feed it.
    ///
    /// The loop ends once every handle has been dropped.
    #[must_use]
    pub fn spawn(self) -> StackingHandle {
        tracing::debug!("stacking: spawning trigger service");
        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        tokio::spawn(self.run(receiver));

        StackingHandle { sender }
    }

    async fn run(self, mut receiver: mpsc::Receiver<NavigationEvent>) {
        while let Some(event) = receiver.recv().await {
            tracing::trace!("stacking: navigation committed in tab {}", event.tab_id);
            drop(self.on_navigation_committed(event));
        }

        tracing::debug!("stacking: trigger service channel closed, exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackingConfig;
    use crate::stacking::host::{MemoryNameStore, MemoryTabDirectory};
    use crate::stacking::state::TabRecord;

    fn make_record(id: i64, url: &str, ext_data: &str) -> TabRecord {
        TabRecord {
            id: TabId::new(id),
            url: url.to_string(),
            pinned: false,
            index: id as usize,
            ext_data: ext_data.to_string(),
        }
    }

    fn make_service(
        records: Vec<TabRecord>,
    ) -> StackingService<MemoryTabDirectory, MemoryNameStore> {
        let engine = PlacementEngine::new(
            Arc::new(StackingConfig::default()),
            Arc::new(MemoryTabDirectory::new(records)),
            Arc::new(MemoryNameStore::new()),
        );
        StackingService::new(engine).with_settle_delay(Duration::ZERO)
    }

    // ========================================================================
    // Event filtering tests
    // ========================================================================

    #[tokio::test]
    async fn test_accept_top_level_navigation() {
        let service = make_service(vec![make_record(1, "https://a.com", "")]);
        let tab = service.accept(NavigationEvent::top_level(TabId::new(1))).await.unwrap();
        assert_eq!(tab.url, "https://a.com");
    }

    #[tokio::test]
    async fn test_accept_ignores_subframes_and_missing_tabs() {
        let service = make_service(vec![make_record(1, "https://a.com", "")]);

        let subframe = NavigationEvent { tab_id: TabId::new(1), frame_type: FrameType::SubFrame };
        assert!(service.accept(subframe).await.is_none());
        assert!(service.accept(NavigationEvent::top_level(TabId::new(42))).await.is_none());
        assert!(service.accept(NavigationEvent::top_level(TabId::INVALID)).await.is_none());
    }

    #[tokio::test]
    async fn test_accept_ignores_pinned_and_panel_tabs() {
        let mut pinned = make_record(1, "https://a.com", "");
        pinned.pinned = true;
        let service =
            make_service(vec![pinned, make_record(2, "https://a.com", r#"{"panelId": "p1"}"#)]);

        assert!(service.accept(NavigationEvent::top_level(TabId::new(1))).await.is_none());
        assert!(service.accept(NavigationEvent::top_level(TabId::new(2))).await.is_none());
    }

    #[test]
    fn test_event_deserializes_from_host_shape() {
        let event: NavigationEvent =
            serde_json::from_str(r#"{"tabId": 7, "frameType": "outermost_frame"}"#).unwrap();
        assert_eq!(event, NavigationEvent::top_level(TabId::new(7)));
    }

    // ========================================================================
    // Pass scheduling tests
    // ========================================================================

    #[tokio::test]
    async fn test_navigation_runs_pass() {
        let service = make_service(vec![
            make_record(0, "https://a.com", ""),
            make_record(1, "https://b.com", ""),
            make_record(2, "https://a.com", ""),
        ]);

        let report = service
            .on_navigation_committed(NavigationEvent::top_level(TabId::new(2)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.assignments(), 2);
        assert_eq!(
            service.engine().directory().order(),
            vec![TabId::new(0), TabId::new(2), TabId::new(1)]
        );
    }

    #[tokio::test]
    async fn test_ignored_navigation_has_no_report() {
        let service = make_service(vec![make_record(0, "https://a.com", "")]);
        let outcome = service
            .on_navigation_committed(NavigationEvent {
                tab_id: TabId::new(0),
                frame_type: FrameType::FencedFrame,
            })
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    // ========================================================================
    // Handle tests
    // ========================================================================

    #[tokio::test]
    async fn test_handle_feeds_service() {
        let service = make_service(vec![
            make_record(0, "https://a.com", ""),
            make_record(1, "https://a.com", ""),
        ]);
        let directory_view = service.clone();
        let handle = service.spawn();

        handle.notify_async(NavigationEvent::top_level(TabId::new(1))).await.unwrap();

        let mut stacked = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let tab = directory_view.engine().directory().record(TabId::new(1)).unwrap();
            if tab.decode().unwrap().stack.stack_id().is_some() {
                stacked = true;
                break;
            }
        }
        assert!(stacked);
        assert!(!handle.is_closed());
    }
}
