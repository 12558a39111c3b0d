//! Folder orchestration, content registry, and tree traversal.

pub mod errors;
pub mod registry;
pub mod service;
pub mod tree;

pub use errors::to_folder_error;
pub use registry::{FolderContentHandler, FolderContentRegistry};
pub use service::FolderService;
