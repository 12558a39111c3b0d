//! In-memory folder database.
//!
//! Used by tests and local development. Transactions work on a private
//! copy of the state and apply the rows they wrote on commit. A commit
//! fails with a conflict if one of those rows was written elsewhere in the
//! meantime.

pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use folderhub_core::result::AppResult;
use folderhub_entity::folder::{
    CreateNestedFolder, Folder, LegacyFolder, SaveLegacyFolder, UpdateNestedFolder,
};

use crate::error::LegacyResult;
use crate::store::{
    FolderDatabase, FolderTransaction, LegacyFolderStore, NestedFolderStore, SyncReport,
};

pub use state::{MemoryState, RowKey};

/// Owner of a [`MemoryState`] lock.
pub trait StateCell: Send + Sync {
    /// The guarded state.
    fn cell(&self) -> &Mutex<MemoryState>;
}

impl StateCell for Arc<Mutex<MemoryState>> {
    fn cell(&self) -> &Mutex<MemoryState> {
        self
    }
}

impl StateCell for Mutex<MemoryState> {
    fn cell(&self) -> &Mutex<MemoryState> {
        self
    }
}

/// Both folder stores over an in-memory state.
#[derive(Debug)]
pub struct MemoryStore<C> {
    state: C,
}

#[async_trait]
impl<C: StateCell> LegacyFolderStore for MemoryStore<C> {
    async fn get_by_uid(&self, org_id: i64, uid: &str) -> LegacyResult<LegacyFolder> {
        self.state.cell().lock().await.legacy_by_uid(org_id, uid)
    }

    async fn get_by_id(&self, org_id: i64, id: i64) -> LegacyResult<LegacyFolder> {
        self.state.cell().lock().await.legacy_by_id(org_id, id)
    }

    async fn get_by_title(&self, org_id: i64, title: &str) -> LegacyResult<LegacyFolder> {
        self.state.cell().lock().await.legacy_by_title(org_id, title)
    }

    async fn get_many(
        &self,
        org_id: i64,
        uids: &[String],
    ) -> LegacyResult<HashMap<String, LegacyFolder>> {
        Ok(self.state.cell().lock().await.legacy_many(org_id, uids))
    }

    async fn list_org_folders(&self, org_id: i64) -> LegacyResult<Vec<LegacyFolder>> {
        Ok(self.state.cell().lock().await.legacy_in_org(org_id))
    }

    async fn save(&self, cmd: &SaveLegacyFolder) -> LegacyResult<LegacyFolder> {
        self.state.cell().lock().await.save_legacy(cmd)
    }

    async fn delete(&self, org_id: i64, id: i64) -> LegacyResult<()> {
        self.state.cell().lock().await.delete_legacy(org_id, id)
    }
}

#[async_trait]
impl<C: StateCell> NestedFolderStore for MemoryStore<C> {
    async fn get(&self, org_id: i64, uid: &str) -> AppResult<Folder> {
        self.state.cell().lock().await.nested_get(org_id, uid)
    }

    async fn get_folders(&self, org_id: i64, uids: &[String]) -> AppResult<Vec<Folder>> {
        Ok(self.state.cell().lock().await.nested_many(org_id, uids))
    }

    async fn get_children(&self, org_id: i64, parent_uid: &str) -> AppResult<Vec<Folder>> {
        Ok(self
            .state
            .cell()
            .lock()
            .await
            .nested_children(org_id, parent_uid))
    }

    async fn get_parents(&self, org_id: i64, uid: &str) -> AppResult<Vec<Folder>> {
        Ok(self.state.cell().lock().await.nested_parents(org_id, uid))
    }

    async fn create(&self, cmd: &CreateNestedFolder) -> AppResult<Folder> {
        self.state.cell().lock().await.nested_create(cmd)
    }

    async fn update(&self, cmd: &UpdateNestedFolder) -> AppResult<Folder> {
        self.state.cell().lock().await.nested_update(cmd)
    }

    async fn delete(&self, org_id: i64, uid: &str) -> AppResult<()> {
        self.state.cell().lock().await.nested_delete(org_id, uid)
    }
}

/// Folder stores over a private copy of the state.
#[derive(Debug)]
pub struct MemoryFolderTransaction {
    store: MemoryStore<Mutex<MemoryState>>,
    base: Arc<Mutex<MemoryState>>,
}

#[async_trait]
impl FolderTransaction for MemoryFolderTransaction {
    fn legacy(&self) -> &dyn LegacyFolderStore {
        &self.store
    }

    fn nested(&self) -> &dyn NestedFolderStore {
        &self.store
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { store, base } = *self;

        let rows = base.lock().await.merge(store.state.into_inner())?;
        debug!(rows, "Committed in-memory folder transaction");
        Ok(())
    }
}

/// In-memory folder database.
#[derive(Debug, Clone, Default)]
pub struct MemoryFolderDatabase {
    store: Arc<MemoryStore<Arc<Mutex<MemoryState>>>>,
}

impl Default for MemoryStore<Arc<Mutex<MemoryState>>> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }
}

impl MemoryFolderDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(legacy, nested)` rows across all organizations.
    pub async fn row_counts(&self) -> (usize, usize) {
        let state = self.store.state.lock().await;
        (state.legacy.len(), state.nested.len())
    }

    /// Write a legacy row without touching the nested table.
    ///
    /// Simulates data written before the nested table existed.
    pub async fn insert_legacy_only(&self, cmd: &SaveLegacyFolder) -> LegacyResult<LegacyFolder> {
        self.store.state.lock().await.save_legacy(cmd)
    }
}

#[async_trait]
impl FolderDatabase for MemoryFolderDatabase {
    fn legacy(&self) -> &dyn LegacyFolderStore {
        self.store.as_ref()
    }

    fn nested(&self) -> &dyn NestedFolderStore {
        self.store.as_ref()
    }

    async fn begin(&self) -> AppResult<Box<dyn FolderTransaction>> {
        let snapshot = self.store.state.lock().await.begin();
        Ok(Box::new(MemoryFolderTransaction {
            store: MemoryStore {
                state: Mutex::new(snapshot),
            },
            base: Arc::clone(&self.store.state),
        }))
    }

    async fn sync_nested_from_legacy(&self) -> AppResult<SyncReport> {
        Ok(self.store.state.lock().await.sync_nested_from_legacy())
    }
}
