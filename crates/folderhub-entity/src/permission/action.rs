//! Permission action definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use folderhub_core::AppError;

/// Actions checked by the access evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionAction {
    /// View a folder.
    #[serde(rename = "folders:read")]
    FoldersRead,
    /// Edit a folder or create folders inside it.
    #[serde(rename = "folders:write")]
    FoldersWrite,
    /// Create folders.
    #[serde(rename = "folders:create")]
    FoldersCreate,
    /// Delete a folder.
    #[serde(rename = "folders:delete")]
    FoldersDelete,
    /// View dashboards (folder-scoped grants imply folder visibility).
    #[serde(rename = "dashboards:read")]
    DashboardsRead,
}

impl PermissionAction {
    /// Return the action as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoldersRead => "folders:read",
            Self::FoldersWrite => "folders:write",
            Self::FoldersCreate => "folders:create",
            Self::FoldersDelete => "folders:delete",
            Self::DashboardsRead => "dashboards:read",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folders:read" => Ok(Self::FoldersRead),
            "folders:write" => Ok(Self::FoldersWrite),
            "folders:create" => Ok(Self::FoldersCreate),
            "folders:delete" => Ok(Self::FoldersDelete),
            "dashboards:read" => Ok(Self::DashboardsRead),
            _ => Err(AppError::bad_request(format!(
                "Invalid permission action: '{s}'"
            ))),
        }
    }
}
