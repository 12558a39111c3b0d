//! Core type definitions used across the FolderHub workspace.

pub mod pagination;

pub use pagination::PageRequest;
