//! Store traits shared by the PostgreSQL and in-memory backends.
//!
//! A [`FolderDatabase`] exposes both stores in auto-commit mode and opens
//! [`FolderTransaction`]s that expose the same two stores over a single
//! transaction. Dropping a transaction without committing rolls it back.

pub mod legacy;
pub mod nested;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use folderhub_core::result::AppResult;

pub use legacy::LegacyFolderStore;
pub use nested::NestedFolderStore;

/// Outcome of a legacy → nested synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Nested rows inserted or refreshed from legacy rows.
    pub upserted: u64,
    /// Nested rows removed because no legacy folder backs them.
    pub removed: u64,
}

/// Both folder stores over one open transaction.
#[async_trait]
pub trait FolderTransaction: Send + Sync {
    /// Legacy store bound to this transaction.
    fn legacy(&self) -> &dyn LegacyFolderStore;

    /// Nested store bound to this transaction.
    fn nested(&self) -> &dyn NestedFolderStore;

    /// Make every write of this transaction visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Entry point to folder persistence.
#[async_trait]
pub trait FolderDatabase: Send + Sync + 'static {
    /// Legacy store, each call auto-committed.
    fn legacy(&self) -> &dyn LegacyFolderStore;

    /// Nested store, each call auto-committed.
    fn nested(&self) -> &dyn NestedFolderStore;

    /// Open a transaction spanning both stores.
    async fn begin(&self) -> AppResult<Box<dyn FolderTransaction>>;

    /// Copy every legacy folder into the nested table (refreshing titles of
    /// rows already present) and drop nested rows with no legacy folder.
    async fn sync_nested_from_legacy(&self) -> AppResult<SyncReport>;
}
