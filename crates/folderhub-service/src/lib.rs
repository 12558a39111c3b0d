//! # folderhub-service
//!
//! Folder service layer for FolderHub. The [`FolderService`] orchestrates
//! the legacy and nested folder stores, the folder guardian, the content
//! registry and the event bus.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod folder;

pub use folder::{FolderContentHandler, FolderContentRegistry, FolderService};
