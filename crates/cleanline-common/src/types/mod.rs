//! Common types shared across the cleanline workspace

use serde::{Deserialize, Serialize};

/// Checksum algorithm type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
            ChecksumAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

/// Pagination parameters for list queries.
///
/// # Examples
///
/// ```rust,ignore
/// use cleanline_common::types::Pagination;
///
/// let pagination = Pagination::page(2, 20); // page 2, 20 items per page
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of items to return
    pub limit: i64,

    /// Number of items to skip
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Creates a new pagination instance with custom values.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Creates pagination for a specific 1-based page with a given page size.
    pub fn page(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        Self {
            limit: page_size,
            offset: (page - 1) * page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_default() {
        let p = Pagination::default();
        assert_eq!(p.limit, 50);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_page_is_one_based() {
        let p = Pagination::page(1, 20);
        assert_eq!(p.offset, 0);
        assert_eq!(p.limit, 20);

        let p2 = Pagination::page(2, 20);
        assert_eq!(p2.offset, 20);
        assert_eq!(p2.limit, 20);
    }
}
