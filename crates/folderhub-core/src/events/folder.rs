//! Folder-related domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events related to folder operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FolderEvent {
    /// A folder title changed.
    TitleUpdated {
        /// The organization.
        org_id: i64,
        /// The legacy numeric folder ID.
        id: i64,
        /// The folder UID.
        uid: String,
        /// The new title.
        title: String,
        /// When the folder was updated.
        timestamp: DateTime<Utc>,
    },
}
