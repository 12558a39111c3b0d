//! Folder guardian: the capability checks the folder service asks for.

use std::sync::Arc;

use tracing::debug;

use folderhub_core::error::AppError;
use folderhub_entity::identity::Principal;
use folderhub_entity::permission::{Evaluator, PermissionAction};

use crate::acl::AccessEvaluator;

/// Answers view/save/delete/create questions for one folder at a time.
#[derive(Clone)]
pub struct FolderGuardian {
    evaluator: Arc<dyn AccessEvaluator>,
}

impl std::fmt::Debug for FolderGuardian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderGuardian").finish()
    }
}

impl FolderGuardian {
    /// Creates a guardian backed by `evaluator`.
    pub fn new(evaluator: Arc<dyn AccessEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Evaluate an arbitrary requirement.
    pub async fn check(&self, principal: &Principal, evaluator: &Evaluator) -> Result<bool, AppError> {
        let allowed = self.evaluator.evaluate(principal, evaluator).await?;
        if !allowed {
            debug!(
                principal = %principal.namespaced_id(),
                required = %evaluator,
                "Folder access denied"
            );
        }
        Ok(allowed)
    }

    /// `folders:read` on the folder.
    pub async fn can_view(&self, principal: &Principal, uid: &str) -> Result<bool, AppError> {
        self.check(principal, &Evaluator::folder(PermissionAction::FoldersRead, uid))
            .await
    }

    /// `folders:write` on the folder.
    pub async fn can_save(&self, principal: &Principal, uid: &str) -> Result<bool, AppError> {
        self.check(principal, &Evaluator::folder(PermissionAction::FoldersWrite, uid))
            .await
    }

    /// `folders:delete` on the folder.
    pub async fn can_delete(&self, principal: &Principal, uid: &str) -> Result<bool, AppError> {
        self.check(principal, &Evaluator::folder(PermissionAction::FoldersDelete, uid))
            .await
    }

    /// `folders:create` under `parent_uid`; an empty parent means the root,
    /// where any `folders:create` grant suffices.
    pub async fn can_create(
        &self,
        principal: &Principal,
        parent_uid: &str,
    ) -> Result<bool, AppError> {
        let evaluator = if parent_uid.is_empty() {
            Evaluator::unscoped(PermissionAction::FoldersCreate)
        } else {
            Evaluator::folder(PermissionAction::FoldersCreate, parent_uid)
        };
        self.check(principal, &evaluator).await
    }
}
