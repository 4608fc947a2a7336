//! Task Producer and FileRecord persistence.
//!
//! Validates an incoming upload, writes it to storage, creates the
//! `FileRecord`, and enqueues the matching task — the only write path into
//! the Work Queue from the API side.

use crate::config::UploadConfig;
use crate::error::AppError;
use crate::models::{FileRecord, FileStatus, FileType};
use crate::queue::WorkQueue;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of accepting an upload: identifiers the client polls with.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadAccepted {
    pub job_id: Uuid,
    pub task_id: Uuid,
    pub file_id: Uuid,
    pub total_size: u64,
}

/// Validates extension, MIME type, and size against [`UploadConfig`].
pub fn validate_upload(
    filename: &str,
    mime_type: &str,
    size_bytes: u64,
    config: &UploadConfig,
) -> Result<FileType, AppError> {
    let extension = filename.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();

    let extension_allowed = config.allowed_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension));
    let mime_allowed = config.allowed_mime_types.iter().any(|m| m == mime_type);

    if !extension_allowed && !mime_allowed {
        return Err(AppError::UnsupportedMediaType(format!(
            "unsupported file type: extension '{extension}', mime '{mime_type}'"
        )));
    }

    if size_bytes > config.max_file_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "file size {size_bytes} exceeds limit of {} bytes",
            config.max_file_size_bytes
        )));
    }

    FileType::from_extension(&extension)
        .ok_or_else(|| AppError::UnsupportedMediaType(format!("unrecognized extension '{extension}'")))
}

/// Writes the upload to storage, creates its `FileRecord`, and enqueues the
/// matching task. Returns the identifiers the client will poll with.
pub async fn accept_upload(
    pool: &PgPool,
    storage: &Storage,
    queue: &WorkQueue,
    config: &UploadConfig,
    original_file_name: &str,
    mime_type: &str,
    data: Vec<u8>,
) -> Result<UploadAccepted, AppError> {
    let size_bytes = data.len() as u64;
    let file_type = validate_upload(original_file_name, mime_type, size_bytes, config)?;

    let job_id = Uuid::new_v4();
    let storage_key = storage.build_upload_key(&job_id.to_string(), original_file_name);

    storage
        .upload(&storage_key, data, Some(mime_type.to_string()))
        .await
        .map_err(|err| AppError::Storage(err.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO file_records
            (id, job_id, original_file_name, file_size, file_type, mime_type, status, uploaded_at)
        VALUES ($1, $1, $2, $3, $4, $5, 'pending', now())
        "#,
    )
    .bind(job_id)
    .bind(original_file_name)
    .bind(size_bytes as i64)
    .bind(file_type)
    .bind(mime_type)
    .execute(pool)
    .await?;

    queue.enqueue(job_id, &storage_key, file_type).await.map_err(|err| AppError::Queue(err.to_string()))?;

    Ok(UploadAccepted {
        job_id,
        task_id: job_id,
        file_id: job_id,
        total_size: size_bytes,
    })
}

pub async fn get_file_record(pool: &PgPool, job_id: Uuid) -> Result<FileRecord, AppError> {
    sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, job_id, original_file_name, file_size, file_type, mime_type, status,
               uploaded_at, completed_at, total_rows, cleaned_rows, exception_rows,
               processing_time_ms, clean_data_path, exception_data_path, error_message
        FROM file_records WHERE job_id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("job '{job_id}' not found")))
}

pub struct ListFilter {
    pub page: i64,
    pub page_size: i64,
    pub status: Option<FileStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn list_file_records(pool: &PgPool, filter: &ListFilter) -> Result<(Vec<FileRecord>, i64), AppError> {
    let offset = (filter.page.max(1) - 1) * filter.page_size;

    let records = sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, job_id, original_file_name, file_size, file_type, mime_type, status,
               uploaded_at, completed_at, total_rows, cleaned_rows, exception_rows,
               processing_time_ms, clean_data_path, exception_data_path, error_message
        FROM file_records
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::timestamptz IS NULL OR uploaded_at >= $2)
          AND ($3::timestamptz IS NULL OR uploaded_at <= $3)
        ORDER BY uploaded_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.status.map(|s| match s {
        FileStatus::Pending => "pending",
        FileStatus::Processing => "processing",
        FileStatus::Completed => "completed",
        FileStatus::Failed => "failed",
    }))
    .bind(filter.start_date)
    .bind(filter.end_date)
    .bind(filter.page_size)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM file_records
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::timestamptz IS NULL OR uploaded_at >= $2)
          AND ($3::timestamptz IS NULL OR uploaded_at <= $3)
        "#,
    )
    .bind(filter.status.map(|s| match s {
        FileStatus::Pending => "pending",
        FileStatus::Processing => "processing",
        FileStatus::Completed => "completed",
        FileStatus::Failed => "failed",
    }))
    .bind(filter.start_date)
    .bind(filter.end_date)
    .fetch_one(pool)
    .await?;

    Ok((records, total))
}

/// Transitions a record to `processing`, called by the worker at task start.
pub async fn mark_processing(pool: &PgPool, job_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE file_records SET status = 'processing' WHERE job_id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Transitions a record to `completed` with final statistics.
#[allow(clippy::too_many_arguments)]
pub async fn mark_completed(
    pool: &PgPool,
    job_id: Uuid,
    total_rows: i64,
    cleaned_rows: i64,
    exception_rows: i64,
    processing_time_ms: i64,
    clean_data_path: &str,
    exception_data_path: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE file_records
        SET status = 'completed', completed_at = now(), total_rows = $2, cleaned_rows = $3,
            exception_rows = $4, processing_time_ms = $5, clean_data_path = $6, exception_data_path = $7
        WHERE job_id = $1
        "#,
    )
    .bind(job_id)
    .bind(total_rows)
    .bind(cleaned_rows)
    .bind(exception_rows)
    .bind(processing_time_ms)
    .bind(clean_data_path)
    .bind(exception_data_path)
    .execute(pool)
    .await?;
    Ok(())
}

/// Transitions a record to `failed` with an error message.
pub async fn mark_failed(pool: &PgPool, job_id: Uuid, error_message: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE file_records SET status = 'failed', completed_at = now(), error_message = $2 WHERE job_id = $1")
        .bind(job_id)
        .bind(error_message)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UploadConfig {
        UploadConfig {
            max_file_size_bytes: 1024,
            allowed_extensions: vec!["csv".to_string(), "xlsx".to_string()],
            allowed_mime_types: vec!["text/csv".to_string()],
        }
    }

    #[test]
    fn test_validate_upload_accepts_known_extension() {
        let result = validate_upload("data.csv", "text/csv", 100, &config());
        assert_eq!(result.unwrap(), FileType::Csv);
    }

    #[test]
    fn test_validate_upload_rejects_unknown_type() {
        let result = validate_upload("image.png", "image/png", 100, &config());
        assert!(matches!(result, Err(AppError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_validate_upload_rejects_oversized_file() {
        let result = validate_upload("data.csv", "text/csv", 2048, &config());
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }
}
