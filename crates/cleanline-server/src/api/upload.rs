//! `POST /api/data-cleaning/upload`

use crate::api::AppState;
use crate::error::AppError;
use crate::jobs;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    job_id: Uuid,
    task_id: Uuid,
    file_id: Uuid,
    message: String,
    total_rows: Option<u64>,
    status: &'static str,
}

pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>, AppError> {
    let mut file_name = None;
    let mut mime_type = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| AppError::BadRequest(e.to_string()))? {
        if field.name() != Some("file") {
            continue;
        }

        file_name = field.file_name().map(|s| s.to_string());
        mime_type = field.content_type().map(|s| s.to_string());

        let upload_id = Uuid::new_v4();
        let total_size = field.headers().get("content-length").and_then(|v| v.to_str().ok()).and_then(|v| v.parse::<u64>().ok());
        state.upload_progress.start_tracking(upload_id, file_name.clone().unwrap_or_default(), total_size.unwrap_or(0));

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| AppError::BadRequest(e.to_string()))? {
            bytes.extend_from_slice(&chunk);
            state.upload_progress.update_progress(upload_id, bytes.len() as u64);
        }
        state.upload_progress.complete_upload(upload_id);

        data = Some(bytes);
    }

    let file_name = file_name.ok_or_else(|| AppError::BadRequest("missing 'file' field".to_string()))?;
    let mime_type = mime_type.unwrap_or_else(|| "application/octet-stream".to_string());
    let data = data.ok_or_else(|| AppError::BadRequest("missing file contents".to_string()))?;

    let accepted = jobs::accept_upload(
        &state.db,
        &state.storage,
        &state.queue,
        &state.config.upload,
        &file_name,
        &mime_type,
        data,
    )
    .await?;

    Ok(Json(UploadResponse {
        job_id: accepted.job_id,
        task_id: accepted.task_id,
        file_id: accepted.file_id,
        message: "file accepted for processing".to_string(),
        total_rows: None,
        status: "pending",
    }))
}
