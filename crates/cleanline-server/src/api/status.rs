//! `status`, `check-status`, `progress`, `metrics`, `report` endpoints.

use crate::api::AppState;
use crate::error::AppError;
use crate::jobs;
use crate::models::FileStatus;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    job_id: Uuid,
    status: FileStatus,
    progress: Option<Value>,
    statistics: Option<Value>,
}

pub async fn status(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Json<StatusResponse>, AppError> {
    let record = jobs::get_file_record(&state.db, job_id).await?;
    let progress = state.progress.snapshot(job_id).map(|p| serde_json::to_value(p).unwrap_or(Value::Null));

    let statistics = matches!(record.status, FileStatus::Completed | FileStatus::Failed).then(|| {
        json!({
            "totalRows": record.total_rows,
            "cleanedRows": record.cleaned_rows,
            "exceptionRows": record.exception_rows,
            "processingTimeMs": record.processing_time_ms,
        })
    });

    Ok(Json(StatusResponse { job_id, status: record.status, progress, statistics }))
}

#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    task_id: Uuid,
    status: crate::models::TaskStatus,
    progress: Option<f64>,
    processed_rows: u64,
    total_rows: u64,
    current_phase: Option<crate::progress::Phase>,
    estimated_time_remaining_ms: Option<u64>,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    error_message: Option<String>,
}

pub async fn check_status(State(state): State<AppState>, Path(task_id): Path<Uuid>) -> Result<Json<TaskStatusResponse>, AppError> {
    let task = state
        .queue
        .status(task_id)
        .await
        .map_err(|e| AppError::Queue(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' not found")))?;

    let progress = state.progress.snapshot(task_id);

    Ok(Json(TaskStatusResponse {
        task_id,
        status: task.status,
        progress: progress.as_ref().map(|p| p.overall_progress),
        processed_rows: progress.as_ref().map(|p| p.processed_rows).unwrap_or(0),
        total_rows: progress.as_ref().map(|p| p.total_rows).unwrap_or(0),
        current_phase: progress.as_ref().map(|p| p.current_phase),
        estimated_time_remaining_ms: progress.as_ref().and_then(|p| p.estimated_time_remaining_ms),
        created_at: task.created_at,
        started_at: task.started_at,
        completed_at: task.completed_at,
        error_message: task.last_error,
    }))
}

pub async fn progress(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Json<crate::progress::Progress>, AppError> {
    state.progress.snapshot(job_id).map(Json).ok_or_else(|| AppError::NotFound(format!("no progress tracked for job '{job_id}'")))
}

pub async fn metrics(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Json<crate::progress::Metrics>, AppError> {
    state.progress.metrics(job_id).map(Json).ok_or_else(|| AppError::NotFound(format!("no metrics sampled for job '{job_id}'")))
}

pub async fn report(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Json<Value>, AppError> {
    let record = jobs::get_file_record(&state.db, job_id).await?;

    if let Some(report) = state.progress.report(
        job_id,
        record.cleaned_rows.unwrap_or(0) as u64,
        record.exception_rows.unwrap_or(0) as u64,
    ) {
        return Ok(Json(serde_json::to_value(report).unwrap_or(Value::Null)));
    }

    // Tracker state already evicted (job finished a while ago); fall back to
    // the statistics persisted on the FileRecord itself.
    Ok(Json(json!({
        "jobId": job_id,
        "processingMode": "sequential",
        "workerCount": 1,
        "avgCpuUsage": 0.0,
        "peakCpuUsage": 0.0,
        "avgMemoryUsageBytes": 0,
        "peakMemoryUsageBytes": 0,
        "avgThroughputRowsPerSec": 0.0,
        "peakThroughputRowsPerSec": 0.0,
        "processingTimeMs": record.processing_time_ms.unwrap_or(0),
        "totalRows": record.total_rows.unwrap_or(0),
        "successCount": record.cleaned_rows.unwrap_or(0),
        "errorCount": record.exception_rows.unwrap_or(0),
    })))
}
