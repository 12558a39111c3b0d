//! Legacy flat folder rows.
//!
//! Before the nested tree existed, folders were rows of the generic
//! `dashboard` table flagged with `is_folder`. These rows remain the source
//! of truth for the sequential ID and the optimistic-lock version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::model::{Folder, folder_url};

/// A folder row of the legacy `dashboard` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LegacyFolder {
    /// Sequential ID.
    pub id: i64,
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// Folder title.
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Parent folder UID (NULL at root level).
    pub folder_uid: Option<String>,
    /// Always `true` for rows handled by the folder service.
    pub is_folder: bool,
    /// Optimistic-lock version.
    pub version: i64,
    /// Creating principal ID.
    pub created_by: i64,
    /// Last updating principal ID.
    pub updated_by: i64,
    /// When the row was created.
    pub created: DateTime<Utc>,
    /// When the row was last updated.
    pub updated: DateTime<Utc>,
}

impl LegacyFolder {
    /// Parent UID, empty at root level.
    pub fn parent_uid(&self) -> &str {
        self.folder_uid.as_deref().unwrap_or_default()
    }

    /// Convert into the service-level folder view.
    pub fn to_folder(&self) -> Folder {
        Folder {
            id: self.id,
            org_id: self.org_id,
            uid: self.uid.clone(),
            title: self.title.clone(),
            description: String::new(),
            parent_uid: self.parent_uid().to_string(),
            version: self.version,
            url: folder_url(&self.uid, &self.slug),
            created_by: self.created_by,
            updated_by: self.updated_by,
            created: self.created,
            updated: self.updated,
        }
    }
}

impl From<LegacyFolder> for Folder {
    fn from(row: LegacyFolder) -> Self {
        row.to_folder()
    }
}

/// Insert-or-update command for the legacy store.
///
/// `id == 0` inserts a new row; otherwise the row with that ID is updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveLegacyFolder {
    /// Existing row ID, or 0 for a new folder.
    pub id: i64,
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Parent folder UID (empty at root level).
    pub folder_uid: String,
    /// Version the caller last saw; checked unless `overwrite`.
    pub version: i64,
    /// Skip the optimistic-lock check.
    pub overwrite: bool,
    /// Principal recorded as the updater (and creator on insert).
    pub user_id: i64,
}
