//! Queries and commands accepted by the folder service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use folderhub_core::types::PageRequest;

use crate::identity::Principal;

/// Look up a single folder. Exactly one selector should be set; they are
/// tried in the order UID, ID, title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetFolderQuery {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID selector.
    pub uid: Option<String>,
    /// Legacy numeric ID selector (`0` is the general folder).
    pub id: Option<i64>,
    /// Title selector.
    pub title: Option<String>,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

impl GetFolderQuery {
    /// Query by UID.
    pub fn by_uid(org_id: i64, uid: impl Into<String>, principal: &Principal) -> Self {
        Self {
            org_id,
            uid: Some(uid.into()),
            principal: Some(principal.clone()),
            ..Default::default()
        }
    }

    /// Query by legacy numeric ID.
    pub fn by_id(org_id: i64, id: i64, principal: &Principal) -> Self {
        Self {
            org_id,
            id: Some(id),
            principal: Some(principal.clone()),
            ..Default::default()
        }
    }

    /// Query by title.
    pub fn by_title(org_id: i64, title: impl Into<String>, principal: &Principal) -> Self {
        Self {
            org_id,
            title: Some(title.into()),
            principal: Some(principal.clone()),
            ..Default::default()
        }
    }
}

/// List the direct children of a folder (empty UID = root level).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetChildrenQuery {
    /// Owning organization.
    pub org_id: i64,
    /// Parent folder UID (empty for the root).
    pub uid: String,
    /// Paging window.
    #[serde(default)]
    pub page: PageRequest,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

impl GetChildrenQuery {
    /// Children of `uid` for `principal`, unpaged.
    pub fn new(org_id: i64, uid: impl Into<String>, principal: &Principal) -> Self {
        Self {
            org_id,
            uid: uid.into(),
            page: PageRequest::default(),
            principal: Some(principal.clone()),
        }
    }
}

/// List the ancestors of a folder, root first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetParentsQuery {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
}

/// Create a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderCommand {
    /// Owning organization.
    pub org_id: i64,
    /// Requested UID (generated when empty).
    pub uid: String,
    /// Folder title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Parent folder UID (empty for root level).
    pub parent_uid: String,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

/// Update a folder's title/description (and, for the legacy row, parent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderCommand {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// New title (ignored when empty).
    pub new_title: Option<String>,
    /// New description.
    pub new_description: Option<String>,
    /// New parent UID for the legacy row.
    pub new_parent_uid: Option<String>,
    /// Version the caller last saw.
    pub version: i64,
    /// Skip the optimistic-lock check.
    pub overwrite: bool,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

/// Move a folder under a new parent (empty = root).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveFolderCommand {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// Destination parent UID (empty for root).
    pub new_parent_uid: String,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

/// Delete a folder and everything below it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteFolderCommand {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// Also delete registered content (e.g. alert rules) inside each folder.
    pub force_delete_rules: bool,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

/// Count resources inside a folder subtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDescendantCountsQuery {
    /// Owning organization.
    pub org_id: i64,
    /// Folder UID.
    pub uid: String,
    /// The requesting principal.
    pub principal: Option<Principal>,
}

/// Resource kind → number of instances in a folder subtree.
pub type DescendantCounts = BTreeMap<String, i64>;
