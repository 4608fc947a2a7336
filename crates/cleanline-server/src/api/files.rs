//! `files` listing and `files/{fileId}` detail endpoints.

use crate::api::response::{ApiResponse, PaginationMeta};
use crate::api::AppState;
use crate::error::AppError;
use crate::jobs::{self, ListFilter};
use crate::models::{FileRecord, FileStatus};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub status: Option<FileStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
) -> Result<ApiResponse<Vec<FileRecord>>, AppError> {
    let filter = ListFilter {
        page: query.page,
        page_size: query.page_size,
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let (records, total) = jobs::list_file_records(&state.db, &filter).await?;
    let meta = PaginationMeta::new(query.page, query.page_size, total);

    Ok(ApiResponse::success_with_meta(records, serde_json::to_value(meta).unwrap_or_default()))
}

pub async fn detail(State(state): State<AppState>, Path(file_id): Path<Uuid>) -> Result<Json<FileRecord>, AppError> {
    let record = jobs::get_file_record(&state.db, file_id).await?;
    Ok(Json(record))
}
