//! `data/clean/{jobId}` and `data/exceptions/{jobId}` paginated row fetch.

use crate::api::response::{ApiResponse, PaginationMeta};
use crate::api::AppState;
use crate::error::AppError;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct CleanRow {
    pub row_number: i64,
    pub fields: Value,
}

#[derive(Debug, Serialize)]
pub struct ExceptionRow {
    pub row_number: i64,
    pub original_data: Value,
    pub errors: Value,
}

pub async fn clean(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<DataQuery>,
) -> Result<ApiResponse<Vec<CleanRow>>, AppError> {
    let offset = (query.page.max(1) - 1) * query.page_size;

    let rows = sqlx::query("SELECT row_number, fields FROM clean_data WHERE job_id = $1 ORDER BY row_number LIMIT $2 OFFSET $3")
        .bind(job_id)
        .bind(query.page_size)
        .bind(offset)
        .fetch_all(&state.db)
        .await?
        .into_iter()
        .map(|row| CleanRow { row_number: row.get("row_number"), fields: row.get("fields") })
        .collect::<Vec<_>>();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clean_data WHERE job_id = $1")
        .bind(job_id)
        .fetch_one(&state.db)
        .await?;

    let meta = PaginationMeta::new(query.page, query.page_size, total);
    Ok(ApiResponse::success_with_meta(rows, serde_json::to_value(meta).unwrap_or_default()))
}

pub async fn exceptions(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<DataQuery>,
) -> Result<ApiResponse<Vec<ExceptionRow>>, AppError> {
    let offset = (query.page.max(1) - 1) * query.page_size;

    let rows = sqlx::query(
        "SELECT row_number, original_data, errors FROM error_log WHERE job_id = $1 ORDER BY row_number LIMIT $2 OFFSET $3",
    )
    .bind(job_id)
    .bind(query.page_size)
    .bind(offset)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .map(|row| ExceptionRow {
        row_number: row.get("row_number"),
        original_data: row.get("original_data"),
        errors: row.get("errors"),
    })
    .collect::<Vec<_>>();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM error_log WHERE job_id = $1")
        .bind(job_id)
        .fetch_one(&state.db)
        .await?;

    let meta = PaginationMeta::new(query.page, query.page_size, total);
    Ok(ApiResponse::success_with_meta(rows, serde_json::to_value(meta).unwrap_or_default()))
}
