//! Permission domain types: actions, scopes, and evaluators.

pub mod action;
pub mod evaluator;
pub mod scope;

pub use action::PermissionAction;
pub use evaluator::Evaluator;
pub use scope::{folder_uid_from_scope, folder_uid_scope, scope_covers};
