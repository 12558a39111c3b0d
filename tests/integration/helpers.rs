//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use folderhub_auth::{FolderInheritanceResolver, ScopeEvaluator};
use folderhub_core::config::FolderConfig;
use folderhub_core::error::{AppError, ErrorKind};
use folderhub_core::events::EventBus;
use folderhub_core::result::AppResult;
use folderhub_database::{FolderDatabase, MemoryFolderDatabase};
use folderhub_entity::folder::{
    CreateFolderCommand, DeleteFolderCommand, Folder, GetChildrenQuery, GetFolderQuery,
    GetParentsQuery, MoveFolderCommand,
};
use folderhub_entity::identity::Principal;
use folderhub_entity::permission::{PermissionAction, folder_uid_scope};
use folderhub_service::{FolderContentHandler, FolderContentRegistry, FolderService};

pub const ORG: i64 = 1;

const ALL_ACTIONS: [PermissionAction; 5] = [
    PermissionAction::FoldersRead,
    PermissionAction::FoldersWrite,
    PermissionAction::FoldersCreate,
    PermissionAction::FoldersDelete,
    PermissionAction::DashboardsRead,
];

/// Test application context
pub struct TestApp {
    /// The service under test
    pub service: FolderService,
    /// Backing store, for direct inspection
    pub db: Arc<MemoryFolderDatabase>,
    /// Principal holding every folder permission
    pub admin: Principal,
}

impl TestApp {
    /// Create a test application with nested folders enabled
    pub fn new() -> Self {
        Self::with_config(FolderConfig::default())
    }

    /// Create a test application with legacy-only behavior
    pub fn legacy_only() -> Self {
        Self::with_config(FolderConfig {
            nested_folders: false,
            ..FolderConfig::default()
        })
    }

    pub fn with_config(config: FolderConfig) -> Self {
        let db = Arc::new(MemoryFolderDatabase::new());
        let database: Arc<dyn FolderDatabase> = db.clone();
        let evaluator = Arc::new(ScopeEvaluator::with_inheritance(
            FolderInheritanceResolver::new(Arc::clone(&database)),
        ));
        let service = FolderService::new(
            database,
            evaluator,
            Arc::new(FolderContentRegistry::new()),
            EventBus::new(16),
            config,
        );

        Self {
            service,
            db,
            admin: admin(),
        }
    }

    /// Create a folder as admin and return it
    pub async fn create(&self, uid: &str, title: &str, parent_uid: &str) -> Folder {
        self.service
            .create(&create_cmd(uid, title, parent_uid, &self.admin))
            .await
            .expect("Failed to create folder")
    }

    /// Create a chain of folders, each under the previous one
    pub async fn create_chain(&self, prefix: &str, length: usize) -> Vec<Folder> {
        let mut chain: Vec<Folder> = Vec::with_capacity(length);
        for i in 1..=length {
            let parent = chain.last().map(|f| f.uid.clone()).unwrap_or_default();
            let uid = format!("{prefix}{i}");
            chain.push(self.create(&uid, &uid, &parent).await);
        }
        chain
    }

    /// Look up a folder by UID as admin
    pub async fn get(&self, uid: &str) -> AppResult<Folder> {
        self.service
            .get(&GetFolderQuery::by_uid(ORG, uid, &self.admin))
            .await
    }

    /// Child UIDs of a folder as seen by `principal`
    pub async fn children(&self, uid: &str, principal: &Principal) -> AppResult<Vec<String>> {
        let children = self
            .service
            .get_children(&GetChildrenQuery::new(ORG, uid, principal))
            .await?;
        Ok(children.into_iter().map(|f| f.uid).collect())
    }

    /// Ancestor UIDs of a folder, root first
    pub async fn parents(&self, uid: &str) -> Vec<String> {
        self.service
            .get_parents(&GetParentsQuery {
                org_id: ORG,
                uid: uid.to_string(),
            })
            .await
            .expect("Failed to get parents")
            .into_iter()
            .map(|f| f.uid)
            .collect()
    }

    /// Move a folder as admin
    pub async fn move_to(&self, uid: &str, new_parent_uid: &str) -> AppResult<Folder> {
        self.service
            .move_folder(&MoveFolderCommand {
                org_id: ORG,
                uid: uid.to_string(),
                new_parent_uid: new_parent_uid.to_string(),
                principal: Some(self.admin.clone()),
            })
            .await
    }

    /// Delete a folder as `principal`
    pub async fn delete_as(
        &self,
        uid: &str,
        force_delete_rules: bool,
        principal: &Principal,
    ) -> AppResult<()> {
        self.service
            .delete(&DeleteFolderCommand {
                org_id: ORG,
                uid: uid.to_string(),
                force_delete_rules,
                principal: Some(principal.clone()),
            })
            .await
    }
}

/// Principal holding every action on every folder
pub fn admin() -> Principal {
    ALL_ACTIONS
        .into_iter()
        .fold(Principal::user(1, ORG, "admin"), |p, action| {
            p.grant(action, "*")
        })
}

/// Principal with no grants
pub fn nobody() -> Principal {
    Principal::user(99, ORG, "nobody")
}

/// Principal granted `actions` on each of `uids`
pub fn granted(id: i64, login: &str, actions: &[PermissionAction], uids: &[&str]) -> Principal {
    let mut principal = Principal::user(id, ORG, login);
    for action in actions {
        for uid in uids {
            principal = principal.grant(*action, folder_uid_scope(uid));
        }
    }
    principal
}

pub fn create_cmd(
    uid: &str,
    title: &str,
    parent_uid: &str,
    principal: &Principal,
) -> CreateFolderCommand {
    CreateFolderCommand {
        org_id: ORG,
        uid: uid.to_string(),
        title: title.to_string(),
        description: String::new(),
        parent_uid: parent_uid.to_string(),
        principal: Some(principal.clone()),
    }
}

/// Assert that `result` failed with `kind`
#[track_caller]
pub fn assert_kind<T: std::fmt::Debug>(result: AppResult<T>, kind: ErrorKind) {
    match result {
        Ok(value) => panic!("expected {kind:?} error, got Ok({value:?})"),
        Err(e) => assert_eq!(e.kind, kind, "unexpected error: {e}"),
    }
}

/// Content handler backed by a per-folder counter map
#[derive(Debug, Default)]
pub struct CountingHandler {
    kind: String,
    items: Mutex<HashMap<String, i64>>,
    deleted: Mutex<Vec<String>>,
    fail_count: bool,
}

impl CountingHandler {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    /// Handler whose count always fails
    pub fn failing(kind: &str) -> Self {
        Self {
            fail_count: true,
            ..Self::new(kind)
        }
    }

    pub async fn put(&self, uid: &str, count: i64) {
        self.items.lock().await.insert(uid.to_string(), count);
    }

    /// Folders whose content was deleted, in call order
    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }
}

#[async_trait]
impl FolderContentHandler for CountingHandler {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn count_in_folder(&self, _org_id: i64, uid: &str, _: &Principal) -> AppResult<i64> {
        if self.fail_count {
            return Err(AppError::internal("count unavailable"));
        }
        Ok(self.items.lock().await.get(uid).copied().unwrap_or(0))
    }

    async fn delete_in_folder(&self, _org_id: i64, uid: &str, _: &Principal) -> AppResult<()> {
        self.items.lock().await.remove(uid);
        self.deleted.lock().await.push(uid.to_string());
        Ok(())
    }
}
