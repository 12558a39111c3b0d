//! Domain events emitted by FolderHub operations.
//!
//! Events are published on the [`EventBus`] and consumed by whatever
//! subsystems subscribe (search indexing, audit logging, ...).

pub mod folder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub use folder::FolderEvent;

use crate::error::AppError;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The principal who caused the event (if applicable).
    pub actor: Option<String>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A folder-related event.
    Folder(FolderEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor: Option<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor,
            payload,
        }
    }
}

/// In-process publish/subscribe bus for domain events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Fails when nobody is listening.
    pub fn publish(&self, event: DomainEvent) -> Result<usize, AppError> {
        self.sender
            .send(event)
            .map_err(|_| AppError::internal("No subscribers for domain event"))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
