//! `download/clean/{jobId}` and `download/exceptions/{jobId}`: stream the
//! finalized XLSX workbook straight from storage.

use crate::api::AppState;
use crate::error::AppError;
use crate::jobs;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn clean(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Response, AppError> {
    let record = jobs::get_file_record(&state.db, job_id).await?;
    let key = record
        .clean_data_path
        .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' has no clean-data result yet")))?;

    download_workbook(&state, &key, "clean.xlsx").await
}

pub async fn exceptions(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Response, AppError> {
    let record = jobs::get_file_record(&state.db, job_id).await?;
    let key = record
        .exception_data_path
        .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' has no exception result yet")))?;

    download_workbook(&state, &key, "exceptions.xlsx").await
}

async fn download_workbook(state: &AppState, key: &str, filename: &str) -> Result<Response, AppError> {
    let bytes = state.storage.download(key).await.map_err(|e| AppError::Storage(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    )
        .into_response())
}
