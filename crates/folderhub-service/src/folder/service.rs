//! Folder service: keeps the legacy and nested stores consistent and
//! enforces folder access rules.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use folderhub_auth::{AccessEvaluator, FolderGuardian};
use folderhub_core::config::FolderConfig;
use folderhub_core::error::{AppError, ErrorKind};
use folderhub_core::events::{DomainEvent, EventBus, EventPayload, FolderEvent};
use folderhub_core::result::AppResult;
use folderhub_database::{FolderDatabase, LegacyFolderStore, LegacyStoreError};
use folderhub_entity::folder::uid::{
    generate_short_uid, is_short_uid_too_long, is_valid_short_uid,
};
use folderhub_entity::folder::{
    ANONYMOUS_PRINCIPAL_ID, CreateFolderCommand, CreateNestedFolder, DeleteFolderCommand,
    DescendantCounts, FOLDER_KIND, Folder, GENERAL_FOLDER_TITLE, GENERAL_FOLDER_UID,
    GetChildrenQuery, GetDescendantCountsQuery, GetFolderQuery, GetParentsQuery, LegacyFolder,
    MoveFolderCommand, SaveLegacyFolder, UpdateFolderCommand, UpdateNestedFolder,
};
use folderhub_entity::identity::Principal;
use folderhub_entity::permission::{Evaluator, PermissionAction, folder_uid_from_scope};

use super::errors::to_folder_error;
use super::registry::FolderContentRegistry;
use super::tree::collect_descendants;

/// Orchestrates folder operations over both stores.
#[derive(Clone)]
pub struct FolderService {
    /// Legacy and nested stores.
    database: Arc<dyn FolderDatabase>,
    /// Folder capability checks.
    guardian: FolderGuardian,
    /// Resource kinds stored inside folders.
    registry: Arc<FolderContentRegistry>,
    /// Domain event bus.
    events: EventBus,
    /// Feature switches and limits.
    config: FolderConfig,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService")
            .field("config", &self.config)
            .finish()
    }
}

/// Input of the save path shared by create and update.
struct SaveDraft<'a> {
    org_id: i64,
    id: i64,
    uid: &'a str,
    title: &'a str,
    folder_uid: &'a str,
    version: i64,
    overwrite: bool,
}

fn require_principal(principal: &Option<Principal>) -> AppResult<&Principal> {
    principal
        .as_ref()
        .ok_or_else(|| AppError::bad_request("missing signed in user"))
}

fn access_denied() -> AppError {
    AppError::access_denied("access denied to folder")
}

/// Expose the legacy sequential ID and version on a nested folder.
fn with_legacy_identity(mut folder: Folder, row: &LegacyFolder) -> Folder {
    folder.id = row.id;
    folder.version = row.version;
    folder.created_by = row.created_by;
    folder.updated_by = row.updated_by;
    folder
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        database: Arc<dyn FolderDatabase>,
        evaluator: Arc<dyn AccessEvaluator>,
        registry: Arc<FolderContentRegistry>,
        events: EventBus,
        config: FolderConfig,
    ) -> Self {
        Self {
            database,
            guardian: FolderGuardian::new(evaluator),
            registry,
            events,
            config,
        }
    }

    /// The content registry handlers register with.
    pub fn registry(&self) -> &Arc<FolderContentRegistry> {
        &self.registry
    }

    /// The bus folder events are published on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    async fn ensure_can_view(&self, principal: &Principal, uid: &str) -> AppResult<()> {
        if self.guardian.can_view(principal, uid).await? {
            Ok(())
        } else {
            Err(access_denied())
        }
    }

    /// Look up a folder by UID, ID or title (tried in that order).
    pub async fn get(&self, query: &GetFolderQuery) -> AppResult<Folder> {
        let principal = require_principal(&query.principal)?;
        let legacy = self.database.legacy();

        let lookup = if let Some(uid) = query.uid.as_deref().filter(|u| !u.is_empty()) {
            legacy.get_by_uid(query.org_id, uid).await
        } else if let Some(id) = query.id {
            if id == 0 {
                return Ok(Folder::general(query.org_id));
            }
            legacy.get_by_id(query.org_id, id).await
        } else if let Some(title) = query.title.as_deref().filter(|t| !t.is_empty()) {
            legacy.get_by_title(query.org_id, title).await
        } else {
            return Err(AppError::bad_request("either uid, id or title must be set"));
        };
        let row = lookup.map_err(to_folder_error)?;

        self.ensure_can_view(principal, &row.uid).await?;

        if !self.config.nested_folders {
            return Ok(row.to_folder());
        }

        let folder = self.database.nested().get(query.org_id, &row.uid).await?;
        Ok(with_legacy_identity(folder, &row))
    }

    /// Direct children of a folder (empty UID = root level).
    ///
    /// Below the root the parent is checked once; at the root every child
    /// is checked and hidden when not viewable.
    pub async fn get_children(&self, query: &GetChildrenQuery) -> AppResult<Vec<Folder>> {
        let principal = require_principal(&query.principal)?;
        let org_id = query.org_id;

        if !query.uid.is_empty() {
            self.ensure_can_view(principal, &query.uid).await?;
        }

        let at_root = query.uid.is_empty();
        let mut visible = Vec::new();

        if !self.config.nested_folders {
            let rows = self
                .database
                .legacy()
                .list_org_folders(org_id)
                .await
                .map_err(to_folder_error)?;
            for row in rows.into_iter().filter(|r| r.parent_uid() == query.uid) {
                if at_root && !self.guardian.can_view(principal, &row.uid).await? {
                    continue;
                }
                visible.push(row.to_folder());
            }
            return Ok(query.page.apply(visible));
        }

        let children = self.database.nested().get_children(org_id, &query.uid).await?;
        let uids: Vec<String> = children.iter().map(|f| f.uid.clone()).collect();
        let rows = self
            .database
            .legacy()
            .get_many(org_id, &uids)
            .await
            .map_err(|e| to_folder_error(e).context("failed to fetch subfolders"))?;

        for child in children {
            let Some(row) = rows.get(&child.uid) else {
                warn!(
                    org_id,
                    uid = %child.uid,
                    "Subfolder missing from the legacy store, skipping"
                );
                continue;
            };
            if at_root && !self.guardian.can_view(principal, &child.uid).await? {
                continue;
            }
            visible.push(with_legacy_identity(child, row));
        }

        Ok(query.page.apply(visible))
    }

    /// Folders shared with the principal that are not already reachable
    /// from the root listing.
    pub async fn get_shared_with_me(
        &self,
        org_id: i64,
        principal: &Principal,
    ) -> AppResult<Vec<Folder>> {
        if !self.config.nested_folders {
            return Ok(Vec::new());
        }

        let mut granted_uids: Vec<String> = Vec::new();
        for action in [PermissionAction::FoldersRead, PermissionAction::DashboardsRead] {
            for scope in principal.scopes(action) {
                if let Some(uid) = folder_uid_from_scope(scope) {
                    if !granted_uids.iter().any(|u| u == uid) {
                        granted_uids.push(uid.to_string());
                    }
                }
            }
        }
        if granted_uids.is_empty() {
            return Ok(Vec::new());
        }

        let nested = self.database.nested();
        let granted: Vec<Folder> = nested
            .get_folders(org_id, &granted_uids)
            .await?
            .into_iter()
            .filter(|f| !f.is_root_level())
            .collect();

        let root = self
            .get_children(&GetChildrenQuery::new(org_id, "", principal))
            .await?;

        let known: HashSet<String> = granted
            .iter()
            .chain(root.iter())
            .map(|f| f.uid.clone())
            .collect();

        let mut shared = Vec::new();
        for folder in granted {
            if known.contains(&folder.parent_uid) {
                continue;
            }
            match nested.get_parents(org_id, &folder.uid).await {
                Ok(parents) if parents.iter().any(|p| known.contains(&p.uid)) => continue,
                Ok(_) => shared.push(folder),
                Err(e) => {
                    warn!(
                        org_id,
                        uid = %folder.uid,
                        error = %e,
                        "Failed to resolve folder ancestors"
                    );
                }
            }
        }

        let uids: Vec<String> = shared.iter().map(|f| f.uid.clone()).collect();
        let rows = self
            .database
            .legacy()
            .get_many(org_id, &uids)
            .await
            .map_err(to_folder_error)?;

        Ok(shared
            .into_iter()
            .filter_map(|f| match rows.get(&f.uid) {
                Some(row) => Some(with_legacy_identity(f, row)),
                None => {
                    warn!(
                        org_id,
                        uid = %f.uid,
                        "Shared folder missing from the legacy store, skipping"
                    );
                    None
                }
            })
            .collect())
    }

    /// Ancestors of a folder, root first. Empty when nested folders are off.
    pub async fn get_parents(&self, query: &GetParentsQuery) -> AppResult<Vec<Folder>> {
        if !self.config.nested_folders {
            return Ok(Vec::new());
        }
        self.database
            .nested()
            .get_parents(query.org_id, &query.uid)
            .await
    }

    /// Validate and normalize a legacy save, then run the guardian check
    /// for it.
    async fn build_save_command(
        &self,
        principal: &Principal,
        draft: SaveDraft<'_>,
    ) -> AppResult<SaveLegacyFolder> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(to_folder_error(LegacyStoreError::TitleEmpty));
        }
        if title.eq_ignore_ascii_case(GENERAL_FOLDER_TITLE) {
            return Err(to_folder_error(LegacyStoreError::FolderNameExists));
        }

        let uid = match draft.uid.trim() {
            "" => generate_short_uid(),
            uid if !is_valid_short_uid(uid) => {
                return Err(to_folder_error(LegacyStoreError::InvalidUid));
            }
            uid if is_short_uid_too_long(uid) => {
                return Err(to_folder_error(LegacyStoreError::UidTooLong));
            }
            uid => uid.to_string(),
        };

        let allowed = if draft.id == 0 {
            self.guardian.can_create(principal, draft.folder_uid).await?
        } else {
            self.guardian.can_save(principal, &uid).await?
        };
        if !allowed {
            return Err(access_denied());
        }

        let user_id = principal.numeric_id().unwrap_or_else(|| {
            debug!(
                principal = %principal.namespaced_id(),
                "Principal has no numeric identity, recording -1"
            );
            ANONYMOUS_PRINCIPAL_ID
        });

        Ok(SaveLegacyFolder {
            id: draft.id,
            org_id: draft.org_id,
            uid,
            title: title.to_string(),
            folder_uid: draft.folder_uid.to_string(),
            version: draft.version,
            overwrite: draft.overwrite,
            user_id,
        })
    }

    /// Check that `parent_uid` can take `uid` as a new child.
    async fn validate_parent(&self, org_id: i64, parent_uid: &str, uid: &str) -> AppResult<()> {
        let nested = self.database.nested();
        nested
            .get(org_id, parent_uid)
            .await
            .map_err(|e| e.context("parent folder"))?;

        if parent_uid == uid {
            return Err(AppError::circular_reference(
                "a folder cannot be its own parent",
            ));
        }

        let ancestors = nested.get_parents(org_id, parent_uid).await?;
        if ancestors.iter().any(|a| a.uid == uid) {
            return Err(AppError::circular_reference(
                "the parent folder is a descendant of the folder",
            ));
        }
        if ancestors.len() + 2 > self.config.max_depth {
            return Err(AppError::max_depth_reached(
                "failed to validate parent folder",
            ));
        }
        Ok(())
    }

    /// Create a folder in the legacy store, then in the nested store.
    ///
    /// When the nested write fails the legacy row is removed again.
    pub async fn create(&self, cmd: &CreateFolderCommand) -> AppResult<Folder> {
        let principal = require_principal(&cmd.principal)?;
        let org_id = cmd.org_id;

        let uid = cmd.uid.trim();
        if uid == GENERAL_FOLDER_UID {
            return Err(to_folder_error(LegacyStoreError::InvalidUid));
        }

        let parent_uid = if self.config.nested_folders {
            cmd.parent_uid.trim()
        } else {
            ""
        };
        if !parent_uid.is_empty() && !self.guardian.can_save(principal, parent_uid).await? {
            return Err(access_denied());
        }

        let save = self
            .build_save_command(
                principal,
                SaveDraft {
                    org_id,
                    id: 0,
                    uid,
                    title: &cmd.title,
                    folder_uid: parent_uid,
                    version: 0,
                    overwrite: false,
                },
            )
            .await?;

        let legacy = self.database.legacy();
        let row = legacy.save(&save).await.map_err(to_folder_error)?;

        let nested = async {
            if !parent_uid.is_empty() {
                self.validate_parent(org_id, parent_uid, &row.uid).await?;
            }
            self.database
                .nested()
                .create(&CreateNestedFolder {
                    org_id,
                    uid: row.uid.clone(),
                    title: row.title.clone(),
                    description: cmd.description.clone(),
                    parent_uid: parent_uid.to_string(),
                })
                .await
        }
        .await;

        let nested = match nested {
            Ok(folder) => folder,
            Err(err) => {
                error!(
                    org_id,
                    uid = %row.uid,
                    folder = ?row,
                    error = %err,
                    "Failed to save folder to the nested folder store"
                );
                if let Err(rollback) = legacy.delete(org_id, row.id).await {
                    error!(
                        org_id,
                        uid = %row.uid,
                        error = %rollback,
                        "Failed to delete legacy folder after nested store failure"
                    );
                }
                return Err(err);
            }
        };

        info!(org_id, uid = %row.uid, parent_uid = %parent_uid, "Folder created");

        let mut folder = row.to_folder();
        folder.parent_uid = nested.parent_uid;
        folder.description = nested.description;
        Ok(folder)
    }

    /// Re-save the legacy row of a folder with the command's changes.
    async fn legacy_update(
        &self,
        store: &dyn LegacyFolderStore,
        principal: &Principal,
        cmd: &UpdateFolderCommand,
    ) -> AppResult<LegacyFolder> {
        let current = store
            .get_by_uid(cmd.org_id, &cmd.uid)
            .await
            .map_err(to_folder_error)?;

        let folder_uid = cmd
            .new_parent_uid
            .as_deref()
            .map(str::trim)
            .unwrap_or_else(|| current.parent_uid())
            .to_string();
        let title = cmd
            .new_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&current.title);

        let save = self
            .build_save_command(
                principal,
                SaveDraft {
                    org_id: cmd.org_id,
                    id: current.id,
                    uid: &current.uid,
                    title,
                    folder_uid: &folder_uid,
                    version: cmd.version,
                    overwrite: cmd.overwrite,
                },
            )
            .await?;

        let saved = store.save(&save).await.map_err(to_folder_error)?;

        if saved.title != current.title {
            let event = DomainEvent::new(
                Some(principal.namespaced_id()),
                EventPayload::Folder(FolderEvent::TitleUpdated {
                    org_id: saved.org_id,
                    id: saved.id,
                    uid: saved.uid.clone(),
                    title: saved.title.clone(),
                    timestamp: saved.updated,
                }),
            );
            if let Err(e) = self.events.publish(event) {
                warn!(
                    org_id = saved.org_id,
                    uid = %saved.uid,
                    error = %e,
                    "Failed to publish folder title update"
                );
            }
        }

        Ok(saved)
    }

    /// Update title and description.
    ///
    /// A `new_parent_uid` equal to the current parent is accepted; any other
    /// parent is rejected, since only [`Self::move_folder`] validates and
    /// writes parent changes to both stores.
    pub async fn update(&self, cmd: &UpdateFolderCommand) -> AppResult<Folder> {
        let principal = require_principal(&cmd.principal)?;
        if let Some(parent_uid) = cmd.new_parent_uid.as_deref() {
            let current = self
                .database
                .legacy()
                .get_by_uid(cmd.org_id, &cmd.uid)
                .await
                .map_err(to_folder_error)?;
            if parent_uid.trim() != current.parent_uid() {
                return Err(AppError::bad_request(
                    "the parent of a folder can only be changed by moving it",
                ));
            }
        }

        let row = self
            .legacy_update(self.database.legacy(), principal, cmd)
            .await?;

        let result = self
            .database
            .nested()
            .update(&UpdateNestedFolder {
                org_id: cmd.org_id,
                uid: cmd.uid.clone(),
                new_title: cmd
                    .new_title
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .map(|_| row.title.clone()),
                new_description: cmd.new_description.clone(),
                new_parent_uid: None,
            })
            .await;

        match result {
            Ok(folder) => Ok(with_legacy_identity(folder, &row)),
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(
                    org_id = cmd.org_id,
                    uid = %cmd.uid,
                    "Updated folder is missing from the nested folder store"
                );
                Ok(row.to_folder())
            }
            Err(e) => Err(e),
        }
    }

    /// Move a folder under a new parent (empty = root).
    ///
    /// Both stores are written in one transaction.
    pub async fn move_folder(&self, cmd: &MoveFolderCommand) -> AppResult<Folder> {
        let principal = require_principal(&cmd.principal)?;
        let org_id = cmd.org_id;
        let destination = cmd.new_parent_uid.trim();

        if !self.config.nested_folders && !destination.is_empty() {
            return Err(AppError::bad_request(
                "nested folders are disabled, folders can only live at the root",
            ));
        }

        let evaluator = if destination.is_empty() {
            Evaluator::unscoped(PermissionAction::FoldersCreate)
        } else {
            Evaluator::folder(PermissionAction::FoldersWrite, destination)
        };
        if !self.guardian.check(principal, &evaluator).await? {
            return Err(access_denied());
        }

        self.database
            .legacy()
            .get_by_uid(org_id, &cmd.uid)
            .await
            .map_err(to_folder_error)?;

        let nested = self.database.nested();
        let parents = if destination.is_empty() {
            Vec::new()
        } else {
            nested
                .get(org_id, destination)
                .await
                .map_err(|e| e.context("destination folder"))?;
            nested.get_parents(org_id, destination).await?
        };

        let height = nested
            .get_height(org_id, &cmd.uid, Some(destination).filter(|d| !d.is_empty()))
            .await?;
        if height + parents.len() + 2 > self.config.max_depth {
            return Err(AppError::max_depth_reached("failed to move folder"));
        }
        if parents.iter().any(|p| p.uid == cmd.uid) {
            return Err(AppError::circular_reference("failed to move folder"));
        }

        let tx = self.database.begin().await?;
        let moved = tx
            .nested()
            .update(&UpdateNestedFolder {
                org_id,
                uid: cmd.uid.clone(),
                new_parent_uid: Some(destination.to_string()),
                ..Default::default()
            })
            .await
            .map_err(|e| e.context("failed to move folder"))?;

        let row = self
            .legacy_update(
                tx.legacy(),
                principal,
                &UpdateFolderCommand {
                    org_id,
                    uid: cmd.uid.clone(),
                    new_parent_uid: Some(destination.to_string()),
                    overwrite: true,
                    principal: cmd.principal.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| e.context("failed to move legacy folder"))?;

        tx.commit().await?;

        info!(org_id, uid = %cmd.uid, destination = %destination, "Folder moved");
        Ok(with_legacy_identity(moved, &row))
    }

    /// Delete a folder, every folder below it and, on request, their
    /// registered content. Runs in one transaction.
    pub async fn delete(&self, cmd: &DeleteFolderCommand) -> AppResult<()> {
        let principal = require_principal(&cmd.principal)?;
        if cmd.uid.is_empty() {
            return Err(AppError::bad_request("missing UID"));
        }
        if cmd.org_id < 1 {
            return Err(AppError::bad_request("invalid orgID"));
        }
        let org_id = cmd.org_id;

        self.database
            .legacy()
            .get_by_uid(org_id, &cmd.uid)
            .await
            .map_err(to_folder_error)?;

        if !self.guardian.can_delete(principal, &cmd.uid).await? {
            return Err(access_denied());
        }

        let tx = self.database.begin().await?;

        let descendants = collect_descendants(tx.nested(), org_id, &cmd.uid).await?;
        for folder in &descendants {
            if !self.guardian.can_view(principal, &folder.uid).await? {
                return Err(access_denied());
            }
        }

        for folder in descendants.iter().rev() {
            info!(org_id, uid = %folder.uid, "Deleting subfolder");
            tx.nested().delete(org_id, &folder.uid).await?;
        }
        match tx.nested().delete(org_id, &cmd.uid).await {
            Ok(()) => {}
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(
                    org_id,
                    uid = %cmd.uid,
                    "Deleted folder is missing from the nested folder store"
                );
            }
            Err(e) => return Err(e),
        }

        let mut uids = Vec::with_capacity(descendants.len() + 1);
        uids.push(cmd.uid.clone());
        uids.extend(descendants.into_iter().map(|f| f.uid));

        let rows = tx
            .legacy()
            .get_many(org_id, &uids)
            .await
            .map_err(|e| to_folder_error(e).context("failed to fetch subfolders"))?;

        let handlers = if cmd.force_delete_rules {
            self.registry.snapshot().await
        } else {
            Vec::new()
        };

        for uid in &uids {
            let Some(row) = rows.get(uid) else {
                warn!(org_id, uid = %uid, "Folder missing from the legacy store, skipping");
                continue;
            };
            for handler in &handlers {
                handler.delete_in_folder(org_id, uid, principal).await?;
            }
            tx.legacy()
                .delete(org_id, row.id)
                .await
                .map_err(to_folder_error)?;
        }

        tx.commit().await?;

        info!(org_id, uid = %cmd.uid, folders = uids.len(), "Folder deleted");
        Ok(())
    }

    /// Count the resources of every registered kind in a folder subtree.
    pub async fn get_descendant_counts(
        &self,
        query: &GetDescendantCountsQuery,
    ) -> AppResult<DescendantCounts> {
        let principal = require_principal(&query.principal)?;
        if query.uid.is_empty() {
            return Err(AppError::bad_request("missing UID"));
        }
        if query.org_id < 1 {
            return Err(AppError::bad_request("invalid orgID"));
        }
        let org_id = query.org_id;

        self.database
            .legacy()
            .get_by_uid(org_id, &query.uid)
            .await
            .map_err(to_folder_error)?;
        self.ensure_can_view(principal, &query.uid).await?;

        let mut uids = vec![query.uid.clone()];
        let mut counts = DescendantCounts::new();

        if self.config.nested_folders {
            let descendants = collect_descendants(self.database.nested(), org_id, &query.uid)
                .await
                .inspect_err(|e| {
                    error!(org_id, uid = %query.uid, error = %e, "Failed to get subfolders");
                })?;
            counts.insert(FOLDER_KIND.to_string(), descendants.len() as i64);
            uids.extend(descendants.into_iter().map(|f| f.uid));
        }

        for handler in self.registry.snapshot().await {
            let total = counts.entry(handler.kind().to_string()).or_insert(0);
            for uid in &uids {
                *total += handler
                    .count_in_folder(org_id, uid, principal)
                    .await
                    .inspect_err(|e| {
                        error!(
                            org_id,
                            uid = %uid,
                            kind = handler.kind(),
                            error = %e,
                            "Failed to count folder descendants"
                        );
                    })?;
            }
        }

        Ok(counts)
    }
}
