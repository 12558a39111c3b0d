//! Paging parameters for list queries.

use serde::{Deserialize, Serialize};

/// Request parameters for paged listings.
///
/// A `limit` of zero means "no limit"; `page` is 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default)]
    pub page: u64,
    /// Maximum number of items per page (0 = unlimited).
    #[serde(default)]
    pub limit: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    /// Whether this request actually restricts the result set.
    pub fn is_limited(&self) -> bool {
        self.limit > 0
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page.max(1).saturating_sub(1) * self.limit
    }

    /// Apply the page window to an already-sorted list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        if !self.is_limited() {
            return items;
        }
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }
}
