//! # folderhub-core
//!
//! Core crate for FolderHub. Contains configuration schemas, domain
//! events, paging types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FolderHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
