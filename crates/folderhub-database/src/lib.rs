//! # folderhub-database
//!
//! Folder persistence for FolderHub: the legacy flat `dashboard` table and
//! the nested `folder` tree table, each behind a store trait, with a
//! PostgreSQL backend (sqlx) and an in-memory backend.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use error::{LegacyResult, LegacyStoreError};
pub use memory::MemoryFolderDatabase;
pub use repositories::PgFolderDatabase;
pub use store::{FolderDatabase, FolderTransaction, LegacyFolderStore, NestedFolderStore, SyncReport};
