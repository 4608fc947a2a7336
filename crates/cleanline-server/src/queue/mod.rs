//! Work Queue: a persistent, at-least-once task queue backed by Postgres.
//!
//! `pending`/`processing`/`dlq` are not separate tables; they are states of
//! a single `queue_tasks` row (see `migrations/`), so a `taskId` can never be
//! torn between two of them. `lease` claims a row with `FOR UPDATE SKIP
//! LOCKED` so concurrent workers never double-lease the same task.

use crate::models::{FileType, QueueTask, TaskStatus};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("task {0} not found")]
    NotFound(Uuid),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Timing/retry tunables, sourced from [`crate::config::QueueConfig`].
#[derive(Debug, Clone, Copy)]
pub struct QueueTiming {
    pub task_timeout_ms: i64,
    pub max_retry_attempts: i32,
    pub base_backoff_ms: i64,
    pub max_backoff_ms: i64,
}

impl From<&crate::config::QueueConfig> for QueueTiming {
    fn from(config: &crate::config::QueueConfig) -> Self {
        Self {
            task_timeout_ms: config.task_timeout_ms as i64,
            max_retry_attempts: config.max_retry_attempts as i32,
            base_backoff_ms: config.base_backoff_ms as i64,
            max_backoff_ms: config.max_backoff_ms as i64,
        }
    }
}

/// Exponential backoff delay before the `attempt`-th retry, per the
/// `BASE * 2^(attempt-1)` law capped at `max_backoff_ms`.
pub fn backoff_delay_ms(attempt: i32, timing: &QueueTiming) -> i64 {
    let exp = attempt.saturating_sub(1).clamp(0, 32);
    let scaled = timing.base_backoff_ms.saturating_mul(1i64 << exp);
    scaled.min(timing.max_backoff_ms)
}

#[derive(Clone)]
pub struct WorkQueue {
    pool: PgPool,
    timing: QueueTiming,
}

impl WorkQueue {
    pub fn new(pool: PgPool, timing: QueueTiming) -> Self {
        Self { pool, timing }
    }

    /// Pushes a new task, status `pending`. `task_id` is shared with the
    /// owning `FileRecord`'s `job_id`.
    pub async fn enqueue(&self, task_id: Uuid, storage_key: &str, file_type: FileType) -> QueueResult<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_tasks (task_id, storage_key, file_type, status, attempts, created_at)
            VALUES ($1, $2, $3, 'pending', 0, now())
            "#,
        )
        .bind(task_id)
        .bind(storage_key)
        .bind(file_type)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically claims the oldest pending (or reclaimable) task for
    /// `worker_id`, or `None` if the queue is empty. A single `UPDATE ...
    /// WHERE task_id = (SELECT ... FOR UPDATE SKIP LOCKED)` so two workers
    /// racing this call never claim the same row.
    pub async fn lease(&self, worker_id: &str) -> QueueResult<Option<QueueTask>> {
        let deadline = Utc::now() + chrono::Duration::milliseconds(self.timing.task_timeout_ms);

        let task = sqlx::query_as::<_, QueueTask>(
            r#"
            UPDATE queue_tasks
            SET status = 'processing',
                started_at = COALESCE(started_at, now()),
                attempts = attempts + 1,
                visibility_deadline = $2,
                locked_by = $1
            WHERE task_id = (
                SELECT task_id FROM queue_tasks
                WHERE status = 'pending'
                ORDER BY created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING task_id, storage_key, file_type, created_at, started_at,
                      completed_at, status, attempts, last_error,
                      visibility_deadline, locked_by
            "#,
        )
        .bind(worker_id)
        .bind(deadline)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Extends a leased task's visibility deadline; called periodically by
    /// the consumer while a task is in flight.
    pub async fn heartbeat(&self, task_id: Uuid) -> QueueResult<()> {
        let deadline = Utc::now() + chrono::Duration::milliseconds(self.timing.task_timeout_ms);
        let result = sqlx::query(
            "UPDATE queue_tasks SET visibility_deadline = $2 WHERE task_id = $1 AND status = 'processing'",
        )
        .bind(task_id)
        .bind(deadline)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound(task_id));
        }
        Ok(())
    }

    /// Marks a task completed; removes it from the processing set.
    pub async fn ack(&self, task_id: Uuid) -> QueueResult<()> {
        sqlx::query(
            "UPDATE queue_tasks SET status = 'completed', completed_at = now(), visibility_deadline = NULL WHERE task_id = $1",
        )
        .bind(task_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a failure. If `retryable` and attempts remain, re-queues with
    /// exponential backoff; otherwise moves the task to the dead-letter
    /// state.
    pub async fn fail(&self, task_id: Uuid, error: &str, retryable: bool) -> QueueResult<()> {
        let task = sqlx::query_as::<_, QueueTask>(
            "SELECT task_id, storage_key, file_type, created_at, started_at, completed_at, status, attempts, last_error, visibility_deadline, locked_by FROM queue_tasks WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(QueueError::NotFound(task_id))?;

        if retryable && task.attempts < self.timing.max_retry_attempts {
            let delay_ms = backoff_delay_ms(task.attempts, &self.timing);
            let available_at = Utc::now() + chrono::Duration::milliseconds(delay_ms);
            sqlx::query(
                r#"
                UPDATE queue_tasks
                SET status = 'pending', last_error = $2, visibility_deadline = NULL,
                    locked_by = NULL, created_at = $3
                WHERE task_id = $1
                "#,
            )
            .bind(task_id)
            .bind(error)
            .bind(available_at)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE queue_tasks SET status = 'failed', last_error = $2, completed_at = now() WHERE task_id = $1",
            )
            .bind(task_id)
            .bind(error)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Sweeps `processing` tasks whose visibility deadline has passed:
    /// treated as a retryable failure, or moved to the dead-letter state
    /// with `status=timeout` once attempts are exhausted. Intended to be
    /// called periodically by the worker supervisor.
    pub async fn reclaim_expired(&self) -> QueueResult<u64> {
        let now = Utc::now();

        let retryable = sqlx::query(
            r#"
            UPDATE queue_tasks
            SET status = 'pending', visibility_deadline = NULL, locked_by = NULL,
                last_error = 'visibility timeout exceeded'
            WHERE status = 'processing' AND visibility_deadline < $1 AND attempts < $2
            "#,
        )
        .bind(now)
        .bind(self.timing.max_retry_attempts)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let expired = sqlx::query(
            r#"
            UPDATE queue_tasks
            SET status = 'timeout', completed_at = now(),
                last_error = 'visibility timeout exceeded, retries exhausted'
            WHERE status = 'processing' AND visibility_deadline < $1 AND attempts >= $2
            "#,
        )
        .bind(now)
        .bind(self.timing.max_retry_attempts)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(retryable + expired)
    }

    pub async fn status(&self, task_id: Uuid) -> QueueResult<Option<QueueTask>> {
        let task = sqlx::query_as::<_, QueueTask>(
            "SELECT task_id, storage_key, file_type, created_at, started_at, completed_at, status, attempts, last_error, visibility_deadline, locked_by FROM queue_tasks WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }
}

/// Retry classification (§7): transient I/O and queue-layer failures are
/// retryable; schema/format/config rejections are not.
pub fn is_retryable(status: &TaskStatus) -> bool {
    !matches!(status, TaskStatus::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> QueueTiming {
        QueueTiming {
            task_timeout_ms: 30_000,
            max_retry_attempts: 3,
            base_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
        }
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let t = timing();
        assert_eq!(backoff_delay_ms(1, &t), 1_000);
        assert_eq!(backoff_delay_ms(2, &t), 2_000);
        assert_eq!(backoff_delay_ms(3, &t), 4_000);
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let t = timing();
        assert_eq!(backoff_delay_ms(20, &t), t.max_backoff_ms);
    }
}
