//! Permission requirements handed to the access evaluator.

use serde::{Deserialize, Serialize};

use super::action::PermissionAction;
use super::scope::folder_uid_scope;

/// A required action, optionally restricted to scopes.
///
/// With scopes, the principal must hold the action on at least one of
/// them; without scopes, holding the action on anything suffices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluator {
    /// The required action.
    pub action: PermissionAction,
    /// Acceptable scopes (empty = any).
    pub scopes: Vec<String>,
}

impl Evaluator {
    /// Require `action` on `scope`.
    pub fn permission(action: PermissionAction, scope: impl Into<String>) -> Self {
        Self {
            action,
            scopes: vec![scope.into()],
        }
    }

    /// Require `action` on the folder `uid`.
    pub fn folder(action: PermissionAction, uid: &str) -> Self {
        Self::permission(action, folder_uid_scope(uid))
    }

    /// Require `action` regardless of scope.
    pub fn unscoped(action: PermissionAction) -> Self {
        Self {
            action,
            scopes: Vec::new(),
        }
    }
}

impl std::fmt::Display for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scopes.is_empty() {
            write!(f, "{}", self.action)
        } else {
            write!(f, "{} on [{}]", self.action, self.scopes.join(", "))
        }
    }
}
