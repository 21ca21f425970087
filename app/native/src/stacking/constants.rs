//! Constants for the stacking engine.

/// Metadata field holding the tab's workspace id.
pub const WORKSPACE_FIELD: &str = "workspaceId";

/// Metadata field holding the tab's stack id.
pub const GROUP_FIELD: &str = "group";

/// Metadata field holding the owning side panel id.
pub const PANEL_FIELD: &str = "panelId";

/// The host's spelling of "no stack".
pub const UNSTACKED_SENTINEL: &str = "undefined";

/// Preference path of the stack name map in the name store.
pub const STACK_NAME_MAP_KEY: &str = "tabs.stacking.name_map";

/// Timing constants.
pub mod timing {
    /// Delay between a navigation commit and the pass it triggers.
    ///
    /// Lets the host finish updating tab state after the commit.
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
}

/// Channel buffer size for the stacking service.
pub const CHANNEL_BUFFER_SIZE: usize = 64;
