//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// UID of the implicit root folder. Reserved; never persisted.
pub const GENERAL_FOLDER_UID: &str = "general";

/// Title of the implicit root folder. Reserved for new folders.
pub const GENERAL_FOLDER_TITLE: &str = "General";

/// Maximum folder depth, counted per the move validation rule.
pub const MAX_NESTED_FOLDER_DEPTH: usize = 8;

/// Resource kind reported for subfolders in descendant counts.
pub const FOLDER_KIND: &str = "folder";

/// Principal ID recorded when the actor has no numeric identity.
pub const ANONYMOUS_PRINCIPAL_ID: i64 = -1;

/// A folder as exposed by the folder service.
///
/// `id` and `version` always come from the legacy store; the nested store
/// leaves them at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Legacy sequential ID.
    pub id: i64,
    /// Owning organization.
    pub org_id: i64,
    /// Unique (per org) short UID.
    pub uid: String,
    /// Folder title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Parent folder UID (empty for root-level folders).
    pub parent_uid: String,
    /// Optimistic-lock version.
    pub version: i64,
    /// Browser URL for the folder.
    pub url: String,
    /// Creating principal ID (`-1` when unknown).
    pub created_by: i64,
    /// Last updating principal ID (`-1` when unknown).
    pub updated_by: i64,
    /// When the folder was created.
    pub created: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated: DateTime<Utc>,
}

impl Folder {
    /// The implicit root folder of an organization.
    pub fn general(org_id: i64) -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        Self {
            id: 0,
            org_id,
            uid: GENERAL_FOLDER_UID.to_string(),
            title: GENERAL_FOLDER_TITLE.to_string(),
            description: String::new(),
            parent_uid: String::new(),
            version: 0,
            url: String::new(),
            created_by: 0,
            updated_by: 0,
            created: epoch,
            updated: epoch,
        }
    }

    /// Check if this is the implicit root folder.
    pub fn is_general(&self) -> bool {
        self.id == 0 && self.uid == GENERAL_FOLDER_UID
    }

    /// Check if this folder sits directly under the root.
    pub fn is_root_level(&self) -> bool {
        self.parent_uid.is_empty()
    }
}

/// A row of the nested `folder` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NestedFolderRow {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// Folder title.
    pub title: String,
    /// Description (nullable in the table).
    pub description: Option<String>,
    /// Parent folder UID (NULL for root-level folders).
    pub parent_uid: Option<String>,
    /// When the row was created.
    pub created: DateTime<Utc>,
    /// When the row was last updated.
    pub updated: DateTime<Utc>,
}

impl From<NestedFolderRow> for Folder {
    fn from(row: NestedFolderRow) -> Self {
        Self {
            id: 0,
            org_id: row.org_id,
            url: folder_url(&row.uid, &slugify(&row.title)),
            uid: row.uid,
            title: row.title,
            description: row.description.unwrap_or_default(),
            parent_uid: row.parent_uid.unwrap_or_default(),
            version: 0,
            created_by: 0,
            updated_by: 0,
            created: row.created,
            updated: row.updated,
        }
    }
}

/// Data required to insert a nested folder row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNestedFolder {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID (already validated by the legacy write).
    pub uid: String,
    /// Folder title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Parent folder UID (empty for root-level).
    pub parent_uid: String,
}

/// Partial update of a nested folder row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNestedFolder {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// New title.
    pub new_title: Option<String>,
    /// New description.
    pub new_description: Option<String>,
    /// New parent UID (`Some("")` moves to root).
    pub new_parent_uid: Option<String>,
}

/// Browser URL for a folder.
pub fn folder_url(uid: &str, slug: &str) -> String {
    format!("/dashboards/f/{uid}/{slug}")
}

/// Lower-case, dash-separated slug of a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
