//! # folderhub-auth
//!
//! Authorization for FolderHub folders.
//!
//! ## Modules
//!
//! - `acl`: the access evaluator seam and a scope-matching evaluator with
//!   folder inheritance
//! - `guardian`: folder-level capability checks used by the folder service

pub mod acl;
pub mod guardian;

pub use acl::{AccessEvaluator, FolderInheritanceResolver, ScopeEvaluator};
pub use guardian::FolderGuardian;
