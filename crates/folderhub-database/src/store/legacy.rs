//! Legacy flat folder store.

use std::collections::HashMap;

use async_trait::async_trait;

use folderhub_entity::folder::uid::{is_short_uid_too_long, is_valid_short_uid};
use folderhub_entity::folder::{GENERAL_FOLDER_TITLE, LegacyFolder, SaveLegacyFolder};

use crate::error::{LegacyResult, LegacyStoreError};

/// Checks every backend applies before a save touches storage.
///
/// Returns the trimmed title.
pub fn validate_save(cmd: &SaveLegacyFolder) -> LegacyResult<String> {
    let title = cmd.title.trim();
    if title.is_empty() {
        return Err(LegacyStoreError::TitleEmpty);
    }
    if title.eq_ignore_ascii_case(GENERAL_FOLDER_TITLE) {
        return Err(LegacyStoreError::FolderNameExists);
    }
    if cmd.uid.is_empty() || !is_valid_short_uid(&cmd.uid) {
        return Err(LegacyStoreError::InvalidUid);
    }
    if is_short_uid_too_long(&cmd.uid) {
        return Err(LegacyStoreError::UidTooLong);
    }
    Ok(title.to_string())
}

/// CRUD over folder rows of the legacy `dashboard` table.
///
/// Only rows with `is_folder = true` are visible through this trait.
#[async_trait]
pub trait LegacyFolderStore: Send + Sync {
    /// Find a folder by UID.
    async fn get_by_uid(&self, org_id: i64, uid: &str) -> LegacyResult<LegacyFolder>;

    /// Find a folder by sequential ID.
    async fn get_by_id(&self, org_id: i64, id: i64) -> LegacyResult<LegacyFolder>;

    /// Find a folder by exact title. Fails when the title is ambiguous.
    async fn get_by_title(&self, org_id: i64, title: &str) -> LegacyResult<LegacyFolder>;

    /// Batch lookup by UID. Missing UIDs are absent from the map.
    async fn get_many(
        &self,
        org_id: i64,
        uids: &[String],
    ) -> LegacyResult<HashMap<String, LegacyFolder>>;

    /// Every folder of an organization, ordered by title.
    async fn list_org_folders(&self, org_id: i64) -> LegacyResult<Vec<LegacyFolder>>;

    /// Insert (`id == 0`) or update a folder row.
    ///
    /// Enforces UID uniqueness, sibling title uniqueness (case-insensitive)
    /// and, unless `overwrite`, the optimistic-lock version. Every update
    /// bumps the version by one; inserts start at version 1.
    async fn save(&self, cmd: &SaveLegacyFolder) -> LegacyResult<LegacyFolder>;

    /// Delete a folder row by sequential ID.
    async fn delete(&self, org_id: i64, id: i64) -> LegacyResult<()>;
}
