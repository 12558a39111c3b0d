//! Folder hierarchy configuration.

use serde::{Deserialize, Serialize};

/// Settings for the folder service during the legacy → nested migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Whether the nested folder tree is enabled (hierarchical mode).
    #[serde(default = "default_true")]
    pub nested_folders: bool,
    /// Maximum folder depth, counted per the move validation rule.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Capacity of the folder event bus.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Sync the nested table from the legacy table at startup.
    #[serde(default = "default_true")]
    pub sync_on_startup: bool,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            nested_folders: true,
            max_depth: default_max_depth(),
            event_buffer: default_event_buffer(),
            sync_on_startup: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    8
}

fn default_event_buffer() -> usize {
    256
}
