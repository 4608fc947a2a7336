//! Persisted domain types shared across the queue, jobs, and API modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Xlsx,
    Xls,
    Csv,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Lifecycle of one ingested file, mirrored 1:1 with its job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Identity and terminal statistics of one ingested file.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileRecord {
    pub id: uuid::Uuid,
    pub job_id: uuid::Uuid,
    pub original_file_name: String,
    pub file_size: i64,
    pub file_type: FileType,
    pub mime_type: String,
    pub status: FileStatus,
    pub uploaded_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_rows: Option<i64>,
    pub cleaned_rows: Option<i64>,
    pub exception_rows: Option<i64>,
    pub processing_time_ms: Option<i64>,
    pub clean_data_path: Option<String>,
    pub exception_data_path: Option<String>,
    pub error_message: Option<String>,
}

/// Lifecycle of one queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Timeout,
}

/// A queued unit of work bound to a [`FileRecord`] via a shared id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueueTask {
    pub task_id: uuid::Uuid,
    pub storage_key: String,
    pub file_type: FileType,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub visibility_deadline: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
}

/// One field-level validation failure recorded against an exception row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowErrorRecord {
    pub field: String,
    pub rule_name: String,
    pub error_message: String,
    pub original_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension_is_case_insensitive() {
        assert_eq!(FileType::from_extension("XLSX"), Some(FileType::Xlsx));
        assert_eq!(FileType::from_extension("csv"), Some(FileType::Csv));
        assert_eq!(FileType::from_extension("pdf"), None);
    }
}
