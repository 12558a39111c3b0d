//! Plain data behind the in-memory backend.
//!
//! All methods are synchronous; the async store impls lock the state and
//! delegate here.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tracing::debug;

use folderhub_core::error::AppError;
use folderhub_core::result::AppResult;
use folderhub_entity::folder::model::slugify;
use folderhub_entity::folder::{
    CreateNestedFolder, Folder, LegacyFolder, MAX_NESTED_FOLDER_DEPTH, NestedFolderRow,
    SaveLegacyFolder, UpdateNestedFolder,
};

use crate::error::{LegacyResult, LegacyStoreError};
use crate::store::SyncReport;
use crate::store::legacy::validate_save;

/// Identity of one row in either table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowKey {
    /// Legacy row by sequential ID.
    Legacy(i64),
    /// Nested row by `(org_id, uid)`.
    Nested(i64, String),
}

/// Both tables of one in-memory database.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Legacy rows keyed by sequential ID.
    pub(crate) legacy: BTreeMap<i64, LegacyFolder>,
    /// Nested rows keyed by `(org_id, uid)`.
    pub(crate) nested: BTreeMap<(i64, String), NestedFolderRow>,
    /// Last sequential ID handed out.
    pub(crate) last_id: i64,
    /// Write counter per row, including removed rows.
    versions: BTreeMap<RowKey, u64>,
    /// Rows written inside a transaction, with their version when first
    /// written. `None` outside transactions.
    written: Option<BTreeMap<RowKey, u64>>,
}

fn nested_key(org_id: i64, uid: &str) -> (i64, String) {
    (org_id, uid.to_string())
}

impl MemoryState {
    fn touch(&mut self, key: RowKey) {
        let version = self.versions.entry(key.clone()).or_default();
        if let Some(written) = self.written.as_mut() {
            written.entry(key).or_insert(*version);
        }
        *version += 1;
    }

    /// Current write counter of a row.
    pub(crate) fn version(&self, key: &RowKey) -> u64 {
        self.versions.get(key).copied().unwrap_or_default()
    }

    /// Private copy that records which rows it writes.
    pub(crate) fn begin(&self) -> Self {
        Self {
            written: Some(BTreeMap::new()),
            ..self.clone()
        }
    }

    /// Apply the rows written by a transaction copy.
    ///
    /// Fails without changing anything if one of those rows was written
    /// here after the copy was taken. Returns the number of rows applied.
    pub(crate) fn merge(&mut self, tx: MemoryState) -> AppResult<usize> {
        let written = tx.written.clone().unwrap_or_default();
        if let Some(key) = written
            .iter()
            .find_map(|(key, start)| (self.version(key) != *start).then_some(key))
        {
            debug!(row = ?key, "Row written concurrently, rejecting commit");
            return Err(AppError::conflict(
                "folder data changed while the transaction was open",
            ));
        }

        for key in written.keys() {
            match key {
                RowKey::Legacy(id) => match tx.legacy.get(id) {
                    Some(row) => {
                        self.legacy.insert(*id, row.clone());
                    }
                    None => {
                        self.legacy.remove(id);
                    }
                },
                RowKey::Nested(org_id, uid) => {
                    let nested = nested_key(*org_id, uid);
                    match tx.nested.get(&nested) {
                        Some(row) => {
                            self.nested.insert(nested, row.clone());
                        }
                        None => {
                            self.nested.remove(&nested);
                        }
                    }
                }
            }
            self.versions.insert(key.clone(), tx.version(key));
        }
        self.last_id = self.last_id.max(tx.last_id);
        Ok(written.len())
    }

    // ── legacy ──────────────────────────────────────────────────────

    pub(crate) fn legacy_by_uid(&self, org_id: i64, uid: &str) -> LegacyResult<LegacyFolder> {
        self.legacy
            .values()
            .find(|f| f.org_id == org_id && f.uid == uid)
            .cloned()
            .ok_or(LegacyStoreError::NotFound)
    }

    pub(crate) fn legacy_by_id(&self, org_id: i64, id: i64) -> LegacyResult<LegacyFolder> {
        self.legacy
            .get(&id)
            .filter(|f| f.org_id == org_id)
            .cloned()
            .ok_or(LegacyStoreError::NotFound)
    }

    pub(crate) fn legacy_by_title(&self, org_id: i64, title: &str) -> LegacyResult<LegacyFolder> {
        let mut matches = self
            .legacy
            .values()
            .filter(|f| f.org_id == org_id && f.title == title);
        match (matches.next(), matches.next()) {
            (None, _) => Err(LegacyStoreError::NotFound),
            (Some(f), None) => Ok(f.clone()),
            (Some(_), Some(_)) => Err(LegacyStoreError::AmbiguousTitle(title.to_string())),
        }
    }

    pub(crate) fn legacy_many(&self, org_id: i64, uids: &[String]) -> HashMap<String, LegacyFolder> {
        self.legacy
            .values()
            .filter(|f| f.org_id == org_id && uids.contains(&f.uid))
            .map(|f| (f.uid.clone(), f.clone()))
            .collect()
    }

    pub(crate) fn legacy_in_org(&self, org_id: i64) -> Vec<LegacyFolder> {
        let mut folders: Vec<LegacyFolder> = self
            .legacy
            .values()
            .filter(|f| f.org_id == org_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        folders
    }

    pub(crate) fn save_legacy(&mut self, cmd: &SaveLegacyFolder) -> LegacyResult<LegacyFolder> {
        let title = validate_save(cmd)?;

        let name_taken = self.legacy.values().any(|f| {
            f.org_id == cmd.org_id
                && f.id != cmd.id
                && f.parent_uid() == cmd.folder_uid
                && f.title.to_lowercase() == title.to_lowercase()
        });
        if name_taken {
            return Err(LegacyStoreError::SameNameInFolderExists);
        }

        let uid_taken = self
            .legacy
            .values()
            .any(|f| f.org_id == cmd.org_id && f.id != cmd.id && f.uid == cmd.uid);
        if uid_taken {
            return Err(LegacyStoreError::SameUidExists);
        }

        let now = Utc::now();
        let parent = (!cmd.folder_uid.is_empty()).then(|| cmd.folder_uid.clone());

        let row = if cmd.id == 0 {
            self.last_id += 1;
            LegacyFolder {
                id: self.last_id,
                org_id: cmd.org_id,
                uid: cmd.uid.clone(),
                slug: slugify(&title),
                title,
                folder_uid: parent,
                is_folder: true,
                version: 1,
                created_by: cmd.user_id,
                updated_by: cmd.user_id,
                created: now,
                updated: now,
            }
        } else {
            let existing = self.legacy_by_id(cmd.org_id, cmd.id)?;
            if !cmd.overwrite && existing.version != cmd.version {
                return Err(LegacyStoreError::VersionMismatch);
            }
            LegacyFolder {
                uid: cmd.uid.clone(),
                slug: slugify(&title),
                title,
                folder_uid: parent,
                version: existing.version + 1,
                updated_by: cmd.user_id,
                updated: now,
                ..existing
            }
        };

        self.legacy.insert(row.id, row.clone());
        self.touch(RowKey::Legacy(row.id));
        Ok(row)
    }

    pub(crate) fn delete_legacy(&mut self, org_id: i64, id: i64) -> LegacyResult<()> {
        self.legacy_by_id(org_id, id)?;
        self.legacy.remove(&id);
        self.touch(RowKey::Legacy(id));
        Ok(())
    }

    // ── nested ──────────────────────────────────────────────────────

    pub(crate) fn nested_get(&self, org_id: i64, uid: &str) -> AppResult<Folder> {
        self.nested
            .get(&nested_key(org_id, uid))
            .cloned()
            .map(Folder::from)
            .ok_or_else(|| AppError::not_found("folder not found"))
    }

    pub(crate) fn nested_many(&self, org_id: i64, uids: &[String]) -> Vec<Folder> {
        let mut folders: Vec<Folder> = uids
            .iter()
            .filter_map(|uid| self.nested.get(&nested_key(org_id, uid)))
            .cloned()
            .map(Folder::from)
            .collect();
        folders.sort_by(|a, b| a.title.cmp(&b.title));
        folders
    }

    pub(crate) fn nested_children(&self, org_id: i64, parent_uid: &str) -> Vec<Folder> {
        let mut children: Vec<Folder> = self
            .nested
            .values()
            .filter(|row| {
                row.org_id == org_id && row.parent_uid.as_deref().unwrap_or_default() == parent_uid
            })
            .cloned()
            .map(Folder::from)
            .collect();
        children.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.uid.cmp(&b.uid)));
        children
    }

    pub(crate) fn nested_parents(&self, org_id: i64, uid: &str) -> Vec<Folder> {
        let mut parents = Vec::new();
        let mut current = self.nested.get(&nested_key(org_id, uid));

        while let Some(row) = current {
            let Some(parent_uid) = row.parent_uid.as_deref() else {
                break;
            };
            if parents.len() >= MAX_NESTED_FOLDER_DEPTH {
                break;
            }
            current = self.nested.get(&nested_key(org_id, parent_uid));
            if let Some(parent) = current {
                parents.push(Folder::from(parent.clone()));
            }
        }

        parents.reverse();
        parents
    }

    pub(crate) fn nested_create(&mut self, cmd: &CreateNestedFolder) -> AppResult<Folder> {
        let key = nested_key(cmd.org_id, &cmd.uid);
        if self.nested.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Folder '{}' already exists",
                cmd.uid
            )));
        }

        let now = Utc::now();
        let row = NestedFolderRow {
            org_id: cmd.org_id,
            uid: cmd.uid.clone(),
            title: cmd.title.clone(),
            description: Some(cmd.description.clone()),
            parent_uid: (!cmd.parent_uid.is_empty()).then(|| cmd.parent_uid.clone()),
            created: now,
            updated: now,
        };
        self.nested.insert(key, row.clone());
        self.touch(RowKey::Nested(cmd.org_id, cmd.uid.clone()));
        Ok(Folder::from(row))
    }

    pub(crate) fn nested_update(&mut self, cmd: &UpdateNestedFolder) -> AppResult<Folder> {
        let row = self
            .nested
            .get_mut(&nested_key(cmd.org_id, &cmd.uid))
            .ok_or_else(|| AppError::not_found("folder not found"))?;

        if let Some(title) = &cmd.new_title {
            row.title = title.clone();
        }
        if let Some(description) = &cmd.new_description {
            row.description = Some(description.clone());
        }
        if let Some(parent) = &cmd.new_parent_uid {
            row.parent_uid = (!parent.is_empty()).then(|| parent.clone());
        }
        row.updated = Utc::now();

        let folder = Folder::from(row.clone());
        self.touch(RowKey::Nested(cmd.org_id, cmd.uid.clone()));
        Ok(folder)
    }

    pub(crate) fn nested_delete(&mut self, org_id: i64, uid: &str) -> AppResult<()> {
        self.nested
            .remove(&nested_key(org_id, uid))
            .ok_or_else(|| AppError::not_found("folder not found"))?;
        self.touch(RowKey::Nested(org_id, uid.to_string()));
        Ok(())
    }

    // ── maintenance ─────────────────────────────────────────────────

    pub(crate) fn sync_nested_from_legacy(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        let mut touched = Vec::new();

        for folder in self.legacy.values() {
            let key = nested_key(folder.org_id, &folder.uid);
            touched.push(key.clone());
            match self.nested.get_mut(&key) {
                Some(row) => {
                    row.title = folder.title.clone();
                    row.updated = folder.updated;
                }
                None => {
                    self.nested.insert(
                        key,
                        NestedFolderRow {
                            org_id: folder.org_id,
                            uid: folder.uid.clone(),
                            title: folder.title.clone(),
                            description: None,
                            parent_uid: folder.folder_uid.clone(),
                            created: folder.created,
                            updated: folder.updated,
                        },
                    );
                }
            }
            report.upserted += 1;
        }

        let legacy = &self.legacy;
        let stale: Vec<(i64, String)> = self
            .nested
            .keys()
            .filter(|(org_id, uid)| {
                !legacy
                    .values()
                    .any(|f| f.org_id == *org_id && &f.uid == uid)
            })
            .cloned()
            .collect();
        for key in &stale {
            self.nested.remove(key);
        }
        report.removed = stale.len() as u64;

        for (org_id, uid) in touched.into_iter().chain(stale) {
            self.touch(RowKey::Nested(org_id, uid));
        }
        report
    }
}
