//! Folder scope inheritance.
//!
//! A grant on a folder applies to every folder below it, so a check on
//! `folders:uid:child` is also satisfied by a grant on any ancestor.

use std::sync::Arc;

use folderhub_core::error::AppError;
use folderhub_database::FolderDatabase;
use folderhub_entity::permission::folder_uid_scope;

/// Resolves the ancestor scopes of folder scopes through the nested store.
#[derive(Clone)]
pub struct FolderInheritanceResolver {
    /// Folder persistence for ancestry lookups.
    database: Arc<dyn FolderDatabase>,
}

impl std::fmt::Debug for FolderInheritanceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderInheritanceResolver").finish()
    }
}

impl FolderInheritanceResolver {
    /// Creates a new inheritance resolver.
    pub fn new(database: Arc<dyn FolderDatabase>) -> Self {
        Self { database }
    }

    /// Scopes of every ancestor of `uid`, nearest parent first.
    ///
    /// An unknown folder has no ancestors.
    pub async fn ancestor_scopes(&self, org_id: i64, uid: &str) -> Result<Vec<String>, AppError> {
        let parents = self
            .database
            .nested()
            .get_parents(org_id, uid)
            .await
            .map_err(|e| e.context("Failed to resolve folder ancestry"))?;

        Ok(parents
            .iter()
            .rev()
            .map(|f| folder_uid_scope(&f.uid))
            .collect())
    }
}
