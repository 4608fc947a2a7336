//! API response envelope types.
//!
//! Error responses are produced by the single `crate::error::AppError`; this
//! module only carries the success-path envelope and pagination metadata.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    /// Create a success response with metadata
    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_prev: Option<bool>,
}

impl PaginationMeta {
    /// Create pagination metadata from 1-based `page`, page size `per_page`,
    /// and total row count.
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if per_page <= 0 { 0 } else { (total as f64 / per_page as f64).ceil() as i64 };
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: Some(page < pages),
            has_prev: Some(page > 1),
        }
    }

    /// Create pagination metadata without navigation flags
    pub fn simple(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if per_page <= 0 { 0 } else { (total as f64 / per_page as f64).ceil() as i64 };
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: None,
            has_prev: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta_computes_pages_and_flags() {
        let meta = PaginationMeta::new(1, 10, 25);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.has_next, Some(true));
        assert_eq!(meta.has_prev, Some(false));
    }

    #[test]
    fn test_pagination_meta_last_page_has_no_next() {
        let meta = PaginationMeta::new(3, 10, 25);
        assert_eq!(meta.has_next, Some(false));
        assert_eq!(meta.has_prev, Some(true));
    }
}
