//! PostgreSQL implementations of the folder stores.
//!
//! The same SQL runs either on a pooled connection (auto-commit) or on an
//! open transaction; [`ConnProvider`] hides which one a store is bound to.

pub mod legacy_folder;
pub mod nested_folder;

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use folderhub_core::error::{AppError, ErrorKind};
use folderhub_core::result::AppResult;

use crate::store::{
    FolderDatabase, FolderTransaction, LegacyFolderStore, NestedFolderStore, SyncReport,
};

/// A connection borrowed for one statement batch.
pub enum PgConn<'a> {
    /// A connection checked out of the pool.
    Pooled(PoolConnection<Postgres>),
    /// The connection of an open transaction.
    Tx(MutexGuard<'a, Transaction<'static, Postgres>>),
}

impl Deref for PgConn<'_> {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Self::Pooled(conn) => conn,
            Self::Tx(tx) => tx,
        }
    }
}

impl DerefMut for PgConn<'_> {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Self::Pooled(conn) => conn,
            Self::Tx(tx) => tx,
        }
    }
}

/// Source of connections for a store.
#[async_trait]
pub trait ConnProvider: Send + Sync {
    /// Borrow a connection.
    async fn conn(&self) -> Result<PgConn<'_>, sqlx::Error>;
}

#[async_trait]
impl ConnProvider for PgPool {
    async fn conn(&self) -> Result<PgConn<'_>, sqlx::Error> {
        Ok(PgConn::Pooled(self.acquire().await?))
    }
}

#[async_trait]
impl ConnProvider for Mutex<Transaction<'static, Postgres>> {
    async fn conn(&self) -> Result<PgConn<'_>, sqlx::Error> {
        Ok(PgConn::Tx(self.lock().await))
    }
}

/// Both folder stores over one connection source.
#[derive(Debug)]
pub struct PgFolderStore<C> {
    conn: C,
}

impl<C: ConnProvider> PgFolderStore<C> {
    pub(crate) async fn acquire(&self) -> Result<PgConn<'_>, sqlx::Error> {
        self.conn.conn().await
    }
}

/// Folder stores bound to an open PostgreSQL transaction.
pub type PgFolderTransaction = PgFolderStore<Mutex<Transaction<'static, Postgres>>>;

#[async_trait]
impl FolderTransaction for PgFolderTransaction {
    fn legacy(&self) -> &dyn LegacyFolderStore {
        self
    }

    fn nested(&self) -> &dyn NestedFolderStore {
        self
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.conn
            .into_inner()
            .commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))
    }
}

/// PostgreSQL-backed folder persistence.
#[derive(Debug, Clone)]
pub struct PgFolderDatabase {
    store: PgFolderStore<PgPool>,
}

impl PgFolderDatabase {
    /// Create the folder database over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            store: PgFolderStore { conn: pool },
        }
    }

    fn pool(&self) -> &PgPool {
        &self.store.conn
    }
}

impl<C: Clone> Clone for PgFolderStore<C> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

#[async_trait]
impl FolderDatabase for PgFolderDatabase {
    fn legacy(&self) -> &dyn LegacyFolderStore {
        &self.store
    }

    fn nested(&self) -> &dyn NestedFolderStore {
        &self.store
    }

    async fn begin(&self) -> AppResult<Box<dyn FolderTransaction>> {
        let tx = self.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgFolderStore {
            conn: Mutex::new(tx),
        }))
    }

    async fn sync_nested_from_legacy(&self) -> AppResult<SyncReport> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let upserted = sqlx::query(
            "INSERT INTO folder (uid, org_id, title, parent_uid, created, updated) \
             SELECT uid, org_id, title, folder_uid, created, updated \
             FROM dashboard WHERE is_folder = TRUE \
             ON CONFLICT (org_id, uid) DO UPDATE \
             SET title = EXCLUDED.title, updated = EXCLUDED.updated",
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert folders", e))?
        .rows_affected();

        let removed = sqlx::query(
            "DELETE FROM folder WHERE NOT EXISTS ( \
                SELECT 1 FROM dashboard d \
                WHERE d.uid = folder.uid AND d.org_id = folder.org_id AND d.is_folder = TRUE \
             )",
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to prune nested folders", e)
        })?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        info!(upserted, removed, "Synchronized nested folders from legacy store");
        Ok(SyncReport { upserted, removed })
    }
}
