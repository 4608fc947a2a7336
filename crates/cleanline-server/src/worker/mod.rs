//! Task Consumer: the worker-side orchestration loop. Leases a task, parses
//! the uploaded file, runs it through the rule engine, persists the split
//! clean/exception sets, and reports the outcome back to the Work Queue.

use crate::config::Config;
use crate::jobs;
use crate::progress::{Phase, ProgressTracker};
use crate::queue::WorkQueue;
use crate::storage::Storage;
use cleanline_engine::engine::RuleEngine;
use cleanline_engine::export::{write_clean_workbook, write_exception_workbook};
use cleanline_engine::parser::csv::CsvRowSource;
use cleanline_engine::parser::xlsx::XlsxRowSource;
use cleanline_engine::parser::{ParseError, RowSource};
use cleanline_engine::processor::{CancellationToken, ParallelProcessor};
use cleanline_engine::row::RawRow;
use cleanline_engine::rule_config::RuleConfigStore;
use cleanline_engine::strategy::registry::StrategyRegistry;
use sqlx::PgPool;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unrecognized storage key extension: {0}")]
    UnrecognizedExtension(String),
}

impl WorkerError {
    /// Retry classification (§7): transient I/O is retryable; malformed
    /// input is not.
    fn retryable(&self) -> bool {
        matches!(self, WorkerError::Storage(_) | WorkerError::Database(_))
    }
}

/// Everything one Task Consumer iteration needs, shared across the worker
/// process's lifetime.
#[derive(Clone)]
pub struct TaskConsumer {
    pool: PgPool,
    storage: Arc<Storage>,
    queue: Arc<WorkQueue>,
    rule_config_store: Arc<RuleConfigStore>,
    strategy_registry: Arc<StrategyRegistry>,
    progress: Arc<ProgressTracker>,
    worker_id: String,
    config: Arc<Config>,
}

impl TaskConsumer {
    pub fn new(
        pool: PgPool,
        storage: Arc<Storage>,
        queue: Arc<WorkQueue>,
        rule_config_store: Arc<RuleConfigStore>,
        strategy_registry: Arc<StrategyRegistry>,
        progress: Arc<ProgressTracker>,
        worker_id: String,
        config: Arc<Config>,
    ) -> Self {
        Self { pool, storage, queue, rule_config_store, strategy_registry, progress, worker_id, config }
    }

    /// Runs the lease/process loop until `shutdown` resolves.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                return;
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
                task = self.queue.lease(&self.worker_id) => {
                    match task {
                        Ok(Some(task)) => {
                            let job_id = task.task_id;
                            if let Err(err) = self.process_task(job_id, &task.storage_key).await {
                                error!(job_id = %job_id, error = %err, "task processing failed");
                                let retryable = err.retryable();
                                let _ = self.queue.fail(job_id, &err.to_string(), retryable).await;
                                let _ = jobs::mark_failed(&self.pool, job_id, &err.to_string()).await;
                            }
                        }
                        Ok(None) => tokio::time::sleep(Duration::from_millis(500)).await,
                        Err(err) => {
                            warn!(error = %err, "queue lease failed");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }
    }

    async fn process_task(&self, job_id: Uuid, storage_key: &str) -> Result<(), WorkerError> {
        jobs::mark_processing(&self.pool, job_id).await.map_err(|e| match e {
            crate::error::AppError::Database(e) => WorkerError::Database(e),
            other => WorkerError::Storage(anyhow::anyhow!(other.to_string())),
        })?;

        self.progress.start(job_id, None, 1);
        self.progress.set_phase(job_id, Phase::Initializing);

        let heartbeat_handle = self.spawn_heartbeat(job_id);

        let started = std::time::Instant::now();
        let result = self.run_pipeline(job_id, storage_key).await;
        heartbeat_handle.abort();

        match result {
            Ok((clean_path, exception_path, total, clean_count, exception_count)) => {
                self.progress.set_phase(job_id, Phase::Completed);
                let report = self.progress.report(job_id, clean_count, exception_count);
                if let Some(report) = report {
                    info!(job_id = %job_id, ?report, "job completed");
                }

                jobs::mark_completed(
                    &self.pool,
                    job_id,
                    total as i64,
                    clean_count as i64,
                    exception_count as i64,
                    started.elapsed().as_millis() as i64,
                    &clean_path,
                    &exception_path,
                )
                .await
                .map_err(|e| WorkerError::Storage(anyhow::anyhow!(e.to_string())))?;

                self.queue.ack(job_id).await.map_err(|e| WorkerError::Storage(anyhow::anyhow!(e.to_string())))?;
                Ok(())
            }
            Err(err) => {
                self.progress.set_phase(job_id, Phase::Failed);
                Err(err)
            }
        }
    }

    async fn run_pipeline(&self, job_id: Uuid, storage_key: &str) -> Result<(String, String, u64, u64, u64), WorkerError> {
        self.progress.set_phase(job_id, Phase::Parsing);
        let bytes = self.storage.download(storage_key).await?;

        let rows = parse_rows(storage_key, bytes)?;
        let total_rows = rows.len() as u64;
        self.progress.set_total_rows(job_id, total_rows);

        self.progress.set_phase(job_id, Phase::Cleaning);
        let config_snapshot = self.rule_config_store.current();
        let engine = Arc::new(RuleEngine::new(self.strategy_registry.clone(), &config_snapshot));

        let worker_count = if total_rows as usize >= self.config.processing.parallel_processing_threshold {
            self.config.processing.max_concurrent_workers
        } else {
            1
        };
        self.progress.set_worker_count(job_id, worker_count);
        let processor = ParallelProcessor::new(engine, worker_count);

        let progress = self.progress.clone();
        let worker_id = self.worker_id.clone();
        let result = processor
            .process(rows, config_snapshot, CancellationToken::new(), move |n| {
                progress.inc_processed(job_id, n as u64, &worker_id);
            })
            .await;

        self.progress.set_phase(job_id, Phase::SavingBatch);
        persist_clean_rows(&self.pool, job_id, &result.clean, self.config.processing.store_batch_size).await?;
        persist_exception_rows(&self.pool, job_id, &result.exceptions, self.config.processing.store_batch_size).await?;

        self.progress.set_phase(job_id, Phase::Finalizing);
        let headers: Vec<String> = collect_headers(&result.clean, &result.exceptions);
        let clean_bytes = write_clean_workbook(&headers, &result.clean)
            .map_err(|e| WorkerError::Storage(anyhow::anyhow!(e.to_string())))?;
        let exception_bytes = write_exception_workbook(&headers, &result.exceptions)
            .map_err(|e| WorkerError::Storage(anyhow::anyhow!(e.to_string())))?;

        let clean_key = self.storage.build_clean_result_key(&job_id.to_string());
        let exception_key = self.storage.build_exception_result_key(&job_id.to_string());
        self.storage.upload(&clean_key, clean_bytes, Some(xlsx_mime())).await?;
        self.storage.upload(&exception_key, exception_bytes, Some(xlsx_mime())).await?;

        Ok((clean_key, exception_key, total_rows, result.stats.clean_count as u64, result.stats.exception_count as u64))
    }

    fn spawn_heartbeat(&self, job_id: Uuid) -> tokio::task::JoinHandle<()> {
        let queue = self.queue.clone();
        let interval_ms = self.config.queue.heartbeat_interval_ms;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            loop {
                ticker.tick().await;
                if queue.heartbeat(job_id).await.is_err() {
                    break;
                }
            }
        })
    }
}

fn xlsx_mime() -> String {
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string()
}

fn parse_rows(storage_key: &str, bytes: Vec<u8>) -> Result<Vec<RawRow>, WorkerError> {
    let lower = storage_key.to_ascii_lowercase();
    let mut rows = Vec::new();

    if lower.ends_with(".csv") {
        let mut source = CsvRowSource::new(Cursor::new(bytes))?;
        while let Some(row) = source.next_row()? {
            rows.push(row);
        }
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        let mut source = XlsxRowSource::new(Cursor::new(bytes))?;
        while let Some(row) = source.next_row()? {
            rows.push(row);
        }
    } else {
        return Err(WorkerError::UnrecognizedExtension(storage_key.to_string()));
    }

    Ok(rows)
}

fn collect_headers(clean: &[cleanline_engine::row::RowOutcome], exceptions: &[cleanline_engine::row::RowOutcome]) -> Vec<String> {
    use cleanline_engine::row::RowOutcome;
    let mut headers = std::collections::BTreeSet::new();
    for outcome in clean.iter().chain(exceptions.iter()) {
        match outcome {
            RowOutcome::Clean { normalized, .. } => headers.extend(normalized.keys().cloned()),
            RowOutcome::Exception { original_data, .. } => headers.extend(original_data.keys().cloned()),
        }
    }
    headers.into_iter().collect()
}

async fn persist_clean_rows(
    pool: &PgPool,
    job_id: Uuid,
    rows: &[cleanline_engine::row::RowOutcome],
    batch_size: usize,
) -> Result<(), WorkerError> {
    use cleanline_engine::row::RowOutcome;

    for chunk in rows.chunks(batch_size.max(1)) {
        let mut tx = pool.begin().await?;
        for outcome in chunk {
            if let RowOutcome::Clean { row_number, normalized } = outcome {
                let fields = serde_json::to_value(normalized).unwrap_or(serde_json::Value::Null);
                sqlx::query(
                    r#"
                    INSERT INTO clean_data (job_id, row_number, fields, created_at)
                    VALUES ($1, $2, $3, now())
                    ON CONFLICT (job_id, row_number) DO UPDATE SET fields = EXCLUDED.fields
                    "#,
                )
                .bind(job_id)
                .bind(*row_number as i64)
                .bind(fields)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
    }

    Ok(())
}

async fn persist_exception_rows(
    pool: &PgPool,
    job_id: Uuid,
    rows: &[cleanline_engine::row::RowOutcome],
    batch_size: usize,
) -> Result<(), WorkerError> {
    use cleanline_engine::row::RowOutcome;

    for chunk in rows.chunks(batch_size.max(1)) {
        let mut tx = pool.begin().await?;
        for outcome in chunk {
            if let RowOutcome::Exception { row_number, original_data, errors } = outcome {
                let original = serde_json::to_value(original_data).unwrap_or(serde_json::Value::Null);
                let errors_json = serde_json::to_value(errors).unwrap_or(serde_json::Value::Null);
                sqlx::query(
                    r#"
                    INSERT INTO error_log (job_id, row_number, original_data, errors, created_at)
                    VALUES ($1, $2, $3, $4, now())
                    ON CONFLICT (job_id, row_number) DO UPDATE SET original_data = EXCLUDED.original_data, errors = EXCLUDED.errors
                    "#,
                )
                .bind(job_id)
                .bind(*row_number as i64)
                .bind(original)
                .bind(errors_json)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_rejects_unknown_extension() {
        let result = parse_rows("uploads/job/data.pdf", vec![]);
        assert!(matches!(result, Err(WorkerError::UnrecognizedExtension(_))));
    }

    #[test]
    fn test_parse_rows_reads_csv() {
        let bytes = b"name,phone\nAlice,13800138000\n".to_vec();
        let rows = parse_rows("uploads/job/data.csv", bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Alice"));
    }
}
