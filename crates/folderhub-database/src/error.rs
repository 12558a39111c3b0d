//! Errors raised by the legacy flat store.
//!
//! The legacy table is shared with dashboards, so its vocabulary speaks of
//! dashboards. The folder service translates these into folder errors.

use thiserror::Error;

pub use sqlx::Error as SqlxError;

/// Legacy store result alias.
pub type LegacyResult<T> = Result<T, LegacyStoreError>;

/// Failure of a legacy store operation.
#[derive(Debug, Error)]
pub enum LegacyStoreError {
    /// No matching row.
    #[error("dashboard not found")]
    NotFound,
    /// Title was empty after trimming.
    #[error("dashboard title cannot be empty")]
    TitleEmpty,
    /// Another row in the same parent has the same title.
    #[error("a dashboard with the same name in the folder already exists")]
    SameNameInFolderExists,
    /// Another row in the org has the same UID.
    #[error("a dashboard with the same uid already exists")]
    SameUidExists,
    /// The row changed since the caller read it.
    #[error("the dashboard has been changed by someone else")]
    VersionMismatch,
    /// UID contains characters outside `[a-zA-Z0-9_-]`.
    #[error("uid contains illegal characters")]
    InvalidUid,
    /// UID is longer than the allowed maximum.
    #[error("uid too long, max 40 characters")]
    UidTooLong,
    /// The title is reserved for the root folder.
    #[error("a folder with that name already exists")]
    FolderNameExists,
    /// More than one row matches a title lookup.
    #[error("more than one dashboard is titled '{0}'")]
    AmbiguousTitle(String),
    /// The underlying database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
