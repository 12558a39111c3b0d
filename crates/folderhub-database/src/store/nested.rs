//! Nested folder tree store.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::warn;

use folderhub_core::error::AppError;
use folderhub_core::result::AppResult;
use folderhub_entity::folder::{
    CreateNestedFolder, Folder, MAX_NESTED_FOLDER_DEPTH, UpdateNestedFolder,
};

/// CRUD and tree queries over the nested `folder` table.
///
/// Folders returned here carry `id == 0` and `version == 0`; those fields
/// belong to the legacy store.
#[async_trait]
pub trait NestedFolderStore: Send + Sync {
    /// Find a folder by UID.
    async fn get(&self, org_id: i64, uid: &str) -> AppResult<Folder>;

    /// Batch lookup by UID. Missing UIDs are skipped.
    async fn get_folders(&self, org_id: i64, uids: &[String]) -> AppResult<Vec<Folder>>;

    /// Direct children of `parent_uid` (empty = root level), ordered by title.
    async fn get_children(&self, org_id: i64, parent_uid: &str) -> AppResult<Vec<Folder>>;

    /// Ancestors of `uid`, root first, excluding the folder itself.
    ///
    /// An unknown UID has no ancestors.
    async fn get_parents(&self, org_id: i64, uid: &str) -> AppResult<Vec<Folder>>;

    /// Insert a folder row. Fails with a conflict if the UID is taken.
    async fn create(&self, cmd: &CreateNestedFolder) -> AppResult<Folder>;

    /// Apply a partial update. Fails with not-found if the row is missing.
    async fn update(&self, cmd: &UpdateNestedFolder) -> AppResult<Folder>;

    /// Delete a single row. Fails with not-found if the row is missing.
    async fn delete(&self, org_id: i64, uid: &str) -> AppResult<()>;

    /// Number of levels below `uid` (a leaf has height 0).
    ///
    /// When `parent_uid` is given and appears anywhere in the subtree, the
    /// walk stops with a circular-reference error: `uid` cannot be moved
    /// under its own descendant.
    async fn get_height(
        &self,
        org_id: i64,
        uid: &str,
        parent_uid: Option<&str>,
    ) -> AppResult<usize> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut level = vec![uid.to_string()];
        let mut height = 0;

        loop {
            let mut next = Vec::new();
            for current in &level {
                if parent_uid == Some(current.as_str()) {
                    return Err(AppError::circular_reference(
                        "the destination folder is inside the folder being moved",
                    ));
                }
                if !visited.insert(current.clone()) {
                    continue;
                }
                for child in self.get_children(org_id, current).await? {
                    if !visited.contains(&child.uid) {
                        next.push(child.uid);
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            height += 1;
            if height > MAX_NESTED_FOLDER_DEPTH {
                warn!(
                    org_id,
                    uid,
                    height,
                    "Folder height exceeds the maximum depth, there may be a circular reference"
                );
                break;
            }
            level = next;
        }

        Ok(height)
    }
}
