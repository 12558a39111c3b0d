//! Access evaluation against a principal's granted scopes.

use async_trait::async_trait;
use tracing::debug;

use folderhub_core::error::AppError;
use folderhub_entity::identity::Principal;
use folderhub_entity::permission::{Evaluator, folder_uid_from_scope, scope_covers};

use super::inheritance::FolderInheritanceResolver;

/// Decides whether a principal satisfies a permission requirement.
///
/// `Ok(false)` is a denial; `Err` is a failure to decide and must be
/// propagated, never treated as a denial.
#[async_trait]
pub trait AccessEvaluator: Send + Sync {
    /// Evaluate `evaluator` for `principal`.
    async fn evaluate(&self, principal: &Principal, evaluator: &Evaluator)
    -> Result<bool, AppError>;
}

/// Matches the principal's grants against the required scopes.
///
/// A grant covers a scope exactly or through a trailing `*` wildcard. With
/// an inheritance resolver, a grant on an ancestor folder also covers its
/// descendants.
#[derive(Debug, Clone, Default)]
pub struct ScopeEvaluator {
    inheritance: Option<FolderInheritanceResolver>,
}

impl ScopeEvaluator {
    /// Evaluator matching grants literally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator that also lets ancestor grants cover descendant folders.
    pub fn with_inheritance(inheritance: FolderInheritanceResolver) -> Self {
        Self {
            inheritance: Some(inheritance),
        }
    }

    fn covered(granted: &[String], required: &str) -> bool {
        granted.iter().any(|g| scope_covers(g, required))
    }
}

#[async_trait]
impl AccessEvaluator for ScopeEvaluator {
    async fn evaluate(
        &self,
        principal: &Principal,
        evaluator: &Evaluator,
    ) -> Result<bool, AppError> {
        let granted = principal.scopes(evaluator.action);
        if granted.is_empty() {
            return Ok(false);
        }
        if evaluator.scopes.is_empty() {
            return Ok(true);
        }

        if evaluator.scopes.iter().any(|s| Self::covered(granted, s)) {
            return Ok(true);
        }

        let Some(inheritance) = &self.inheritance else {
            return Ok(false);
        };

        for scope in &evaluator.scopes {
            let Some(uid) = folder_uid_from_scope(scope) else {
                continue;
            };
            for ancestor in inheritance.ancestor_scopes(principal.org_id, uid).await? {
                if Self::covered(granted, &ancestor) {
                    debug!(
                        principal = %principal.namespaced_id(),
                        scope = %scope,
                        via = %ancestor,
                        "Access granted through ancestor folder"
                    );
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}
