//! Parallel Processor: fans a batch of rows out across a bounded worker pool,
//! then re-assembles results in row order.

use crate::constants::{MAX_CONCURRENT_WORKERS, MAX_PROCESSING_TIME_MS, PARALLEL_PROCESSING_THRESHOLD};
use crate::engine::RuleEngine;
use crate::row::{RawRow, RowError, RowOutcome};
use crate::rule_config::types::RuleConfiguration;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::warn;

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total_rows: usize,
    pub clean_count: usize,
    pub exception_count: usize,
    pub timed_out_count: usize,
}

pub struct ProcessingResult {
    pub clean: Vec<RowOutcome>,
    pub exceptions: Vec<RowOutcome>,
    pub stats: ProcessingStats,
}

/// Cooperative cancellation flag shared between a job's owner and the
/// processor; checked between batches, never mid-row.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ParallelProcessor {
    engine: Arc<RuleEngine>,
    worker_count: usize,
}

impl ParallelProcessor {
    pub fn new(engine: Arc<RuleEngine>, requested_workers: usize) -> Self {
        let worker_count = requested_workers.clamp(1, MAX_CONCURRENT_WORKERS);
        Self { engine, worker_count }
    }

    /// Process `rows` against `config`. Runs sequentially below the
    /// configured parallelism threshold to avoid paying fan-out overhead on
    /// small batches; otherwise distributes across the worker pool.
    pub async fn process(
        &self,
        rows: Vec<RawRow>,
        config: Arc<RuleConfiguration>,
        cancellation: CancellationToken,
        mut progress: impl FnMut(usize) + Send,
    ) -> ProcessingResult {
        let total_rows = rows.len();

        if total_rows < PARALLEL_PROCESSING_THRESHOLD || self.worker_count == 1 {
            let mut outcomes = Vec::with_capacity(total_rows);
            for (processed, row) in rows.into_iter().enumerate() {
                if cancellation.is_cancelled() {
                    break;
                }
                outcomes.push(evaluate_with_timeout(&self.engine, row, &config));
                progress(processed + 1);
            }
            return finalize(outcomes, total_rows);
        }

        let (work_tx, work_rx) = mpsc::channel::<RawRow>(self.worker_count * 4);
        let work_rx = Arc::new(tokio::sync::Mutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<RowOutcome>(self.worker_count * 4);

        let mut handles = Vec::with_capacity(self.worker_count);
        for _ in 0..self.worker_count {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let engine = self.engine.clone();
            let config = config.clone();
            let cancellation = cancellation.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    if cancellation.is_cancelled() {
                        break;
                    }
                    let row = {
                        let mut receiver = work_rx.lock().await;
                        receiver.recv().await
                    };
                    let Some(row) = row else { break };
                    let outcome = evaluate_with_timeout(&engine, row, &config);
                    if result_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let feeder_cancellation = cancellation.clone();
        let feeder = tokio::spawn(async move {
            for row in rows {
                if feeder_cancellation.is_cancelled() {
                    break;
                }
                if work_tx.send(row).await.is_err() {
                    break;
                }
            }
        });

        let mut outcomes = Vec::with_capacity(total_rows);
        let processed = AtomicUsize::new(0);
        while let Some(outcome) = result_rx.recv().await {
            outcomes.push(outcome);
            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            progress(count);
        }

        let _ = feeder.await;
        for handle in handles {
            let _ = handle.await;
        }

        finalize(outcomes, total_rows)
    }
}

fn evaluate_with_timeout(engine: &RuleEngine, row: RawRow, config: &RuleConfiguration) -> RowOutcome {
    let row_number = row.row_number;
    let started = std::time::Instant::now();
    let outcome = engine.evaluate_row(&row, config);
    let elapsed = started.elapsed();
    if elapsed > Duration::from_millis(MAX_PROCESSING_TIME_MS) {
        warn!(row_number, elapsed_ms = elapsed.as_millis() as u64, "row exceeded processing time budget");
    }
    outcome
}

fn finalize(mut outcomes: Vec<RowOutcome>, total_rows: usize) -> ProcessingResult {
    outcomes.sort_by_key(|o| o.row_number());

    let mut clean = Vec::new();
    let mut exceptions = Vec::new();
    for outcome in outcomes {
        match &outcome {
            RowOutcome::Clean { .. } => clean.push(outcome),
            RowOutcome::Exception { .. } => exceptions.push(outcome),
        }
    }

    let stats = ProcessingStats {
        total_rows,
        clean_count: clean.len(),
        exception_count: exceptions.len(),
        timed_out_count: 0,
    };

    ProcessingResult { clean, exceptions, stats }
}

/// Builds a synthetic exception outcome for a row that could not be parsed
/// at all (e.g. malformed CSV record), so a parse failure never silently
/// drops a row from the totals.
pub fn unparseable_row_outcome(row_number: u64, reason: String) -> RowOutcome {
    RowOutcome::Exception {
        row_number,
        original_data: BTreeMap::new(),
        errors: vec![RowError {
            field: "__row__".to_string(),
            rule_name: "parse".to_string(),
            error_message: reason,
            original_value: None,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::registry::StrategyRegistry;

    fn row(n: u64) -> RawRow {
        RawRow::new(n)
    }

    #[tokio::test]
    async fn test_sequential_path_preserves_order() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let config = Arc::new(RuleConfiguration::empty());
        let engine = Arc::new(RuleEngine::new(registry, &config));
        let processor = ParallelProcessor::new(engine, 4);

        let rows = vec![row(3), row(1), row(2)];
        let result = processor
            .process(rows, config, CancellationToken::new(), |_| {})
            .await;

        let numbers: Vec<u64> = result.clean.iter().map(|o| o.row_number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(result.stats.total_rows, 3);
    }

    #[tokio::test]
    async fn test_cancellation_stops_early() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let config = Arc::new(RuleConfiguration::empty());
        let engine = Arc::new(RuleEngine::new(registry, &config));
        let processor = ParallelProcessor::new(engine, 1);

        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let rows = vec![row(1), row(2), row(3)];
        let result = processor.process(rows, config, cancellation, |_| {}).await;

        assert!(result.clean.len() < 3);
    }
}
