//! # folderhub-entity
//!
//! Domain entity models for FolderHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod folder;
pub mod identity;
pub mod permission;
