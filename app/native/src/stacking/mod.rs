//! Automatic tab stacking.
//!
//! Gathers the tabs of a browser window into stacks by hostname, one
//! workspace at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Navigation Trigger Service                  │
//! │  - Filters committed navigations (top-level, real tabs)     │
//! │  - Waits for the host to settle, then starts a pass         │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ target Tab
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Placement Engine                         │
//! │  - Snapshot: workspace → stack → tabs                       │
//! │  - Key identity map: grouping key → claimed stacks          │
//! │  - Buckets tabs and plans the target's bucket               │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ Vec<StackCommand>
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Command Executor                          │
//! │  - Applies commands in order via TabDirectory / NameStore   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod constants;
pub mod domain;
pub mod host;
pub mod namer;
pub mod placement;
pub mod resolver;
pub mod rules;
pub mod service;
pub mod snapshot;
pub mod state;

pub use commands::{CommandExecutor, PassReport, StackCommand};
pub use domain::{KeyResolver, SuffixDecomposer, UrlDecomposer, UrlFragments};
pub use host::{MemoryNameStore, MemoryTabDirectory, NameStore, StackNames, TabDirectory};
pub use placement::PlacementEngine;
pub use resolver::KeyIdentityMap;
pub use service::{FrameType, NavigationEvent, StackingHandle, StackingService, TriggerError};
pub use snapshot::TabSnapshot;
pub use state::{StackId, StackSlot, Tab, TabId, TabRecord, WorkspaceKey};
