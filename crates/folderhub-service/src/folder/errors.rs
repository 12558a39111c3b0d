//! Translation of legacy store errors into folder errors.

use folderhub_core::error::{AppError, ErrorKind};
use folderhub_database::LegacyStoreError;

/// Map a legacy (dashboard-table) error onto the folder vocabulary.
pub fn to_folder_error(err: LegacyStoreError) -> AppError {
    match err {
        LegacyStoreError::NotFound => AppError::not_found("folder not found"),
        LegacyStoreError::TitleEmpty => AppError::bad_request("folder title cannot be empty"),
        LegacyStoreError::SameNameInFolderExists => {
            AppError::conflict("a folder with the same name already exists")
        }
        LegacyStoreError::SameUidExists => {
            AppError::conflict("a folder with the same uid already exists")
        }
        LegacyStoreError::VersionMismatch => {
            AppError::conflict("the folder has been changed by someone else")
        }
        LegacyStoreError::FolderNameExists => {
            AppError::conflict("a folder or dashboard with that name already exists")
        }
        LegacyStoreError::InvalidUid => AppError::bad_request("invalid uid for folder provided"),
        LegacyStoreError::UidTooLong => AppError::bad_request("uid for folder is too long"),
        LegacyStoreError::AmbiguousTitle(title) => {
            AppError::bad_request(format!("more than one folder is titled '{title}'"))
        }
        LegacyStoreError::Database(e) => {
            AppError::with_source(ErrorKind::Database, "Legacy folder query failed", e)
        }
    }
}
