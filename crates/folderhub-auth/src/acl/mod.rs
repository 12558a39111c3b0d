//! Access evaluation with folder scope inheritance.

pub mod evaluator;
pub mod inheritance;

pub use evaluator::{AccessEvaluator, ScopeEvaluator};
pub use inheritance::FolderInheritanceResolver;
