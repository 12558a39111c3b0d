//! Requesting principal (signed-in user, service account, ...).

pub mod namespace;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::permission::PermissionAction;

pub use namespace::Namespace;

/// The identity a request is executed on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Identity namespace.
    pub namespace: Namespace,
    /// Identifier within the namespace (numeric for users and service accounts).
    pub id: String,
    /// Organization the principal is acting in.
    pub org_id: i64,
    /// Login or display name.
    pub login: String,
    /// Granted scopes per action.
    #[serde(default)]
    pub permissions: HashMap<PermissionAction, Vec<String>>,
}

impl Principal {
    /// A user principal with no grants.
    pub fn user(id: i64, org_id: i64, login: impl Into<String>) -> Self {
        Self {
            namespace: Namespace::User,
            id: id.to_string(),
            org_id,
            login: login.into(),
            permissions: HashMap::new(),
        }
    }

    /// An anonymous principal with no grants.
    pub fn anonymous(org_id: i64) -> Self {
        Self {
            namespace: Namespace::Anonymous,
            id: "0".to_string(),
            org_id,
            login: "anonymous".to_string(),
            permissions: HashMap::new(),
        }
    }

    /// Add a grant of `action` on `scope`.
    pub fn grant(mut self, action: PermissionAction, scope: impl Into<String>) -> Self {
        self.permissions
            .entry(action)
            .or_default()
            .push(scope.into());
        self
    }

    /// Scopes granted for `action`.
    pub fn scopes(&self, action: PermissionAction) -> &[String] {
        self.permissions
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Numeric identity for users and service accounts.
    ///
    /// Returns `None` for other namespaces or when the ID is not numeric.
    pub fn numeric_id(&self) -> Option<i64> {
        if !self.namespace.has_numeric_id() {
            return None;
        }
        self.id.parse::<i64>().ok().filter(|id| *id != 0)
    }

    /// Namespaced identifier, e.g. `user:42`.
    pub fn namespaced_id(&self) -> String {
        format!("{}:{}", self.namespace, self.id)
    }
}
