//! Identity namespaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use folderhub_core::AppError;

/// Namespace an identity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// A regular signed-in user.
    User,
    /// A service account.
    ServiceAccount,
    /// An API key.
    ApiKey,
    /// An anonymous visitor.
    Anonymous,
    /// The image renderer.
    RenderService,
}

impl Namespace {
    /// Return the namespace as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ServiceAccount => "service-account",
            Self::ApiKey => "api-key",
            Self::Anonymous => "anonymous",
            Self::RenderService => "render",
        }
    }

    /// Whether identities in this namespace carry a numeric ID.
    pub fn has_numeric_id(&self) -> bool {
        matches!(self, Self::User | Self::ServiceAccount)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "service-account" => Ok(Self::ServiceAccount),
            "api-key" => Ok(Self::ApiKey),
            "anonymous" => Ok(Self::Anonymous),
            "render" => Ok(Self::RenderService),
            _ => Err(AppError::bad_request(format!("Invalid namespace: '{s}'"))),
        }
    }
}
