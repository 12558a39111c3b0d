//! Registry of resource kinds that live inside folders.
//!
//! Other subsystems (dashboards, library panels, alert rules, ...)
//! register a handler so the folder service can count and delete their
//! resources without knowing about them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use folderhub_core::result::AppResult;
use folderhub_entity::identity::Principal;

/// A kind of resource stored in folders.
#[async_trait]
pub trait FolderContentHandler: Send + Sync {
    /// Resource kind, used as the key in descendant counts.
    fn kind(&self) -> &str;

    /// Number of resources of this kind directly inside the folder.
    async fn count_in_folder(&self, org_id: i64, uid: &str, principal: &Principal)
    -> AppResult<i64>;

    /// Delete every resource of this kind directly inside the folder.
    async fn delete_in_folder(&self, org_id: i64, uid: &str, principal: &Principal)
    -> AppResult<()>;
}

/// Content handlers keyed by kind.
pub struct FolderContentRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn FolderContentHandler>>>,
}

impl std::fmt::Debug for FolderContentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderContentRegistry").finish()
    }
}

impl FolderContentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler. A handler already registered for the same kind
    /// is replaced.
    pub async fn register(&self, handler: Arc<dyn FolderContentHandler>) {
        let kind = handler.kind().to_string();
        let mut handlers = self.handlers.write().await;
        if handlers.insert(kind.clone(), handler).is_some() {
            info!(kind = %kind, "Replaced folder content handler");
        } else {
            info!(kind = %kind, "Registered folder content handler");
        }
    }

    /// Handler for `kind`, if any.
    pub async fn get(&self, kind: &str) -> Option<Arc<dyn FolderContentHandler>> {
        self.handlers.read().await.get(kind).cloned()
    }

    /// Point-in-time copy of all handlers, ordered by kind.
    ///
    /// Registrations made after the call are not seen by the caller.
    pub async fn snapshot(&self) -> Vec<Arc<dyn FolderContentHandler>> {
        let handlers = self.handlers.read().await;
        let mut all: Vec<Arc<dyn FolderContentHandler>> = handlers.values().cloned().collect();
        all.sort_by(|a, b| a.kind().cmp(b.kind()));
        all
    }

    /// Number of registered kinds.
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Whether nothing is registered.
    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

impl Default for FolderContentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
