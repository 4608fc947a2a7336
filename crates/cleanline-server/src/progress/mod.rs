//! Progress Tracker: per-job progress/metrics state held in memory, sampled
//! by a background task while a job is active.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use sysinfo::{Pid, System};
use uuid::Uuid;

/// Lifecycle phase of one job, reported in [`Progress::current_phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Estimating,
    Preparing,
    Initializing,
    Parsing,
    Cleaning,
    SavingBatch,
    Finalizing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProgress {
    pub worker_id: String,
    pub processed_rows: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub job_id: Uuid,
    pub overall_progress: f64,
    pub processed_rows: u64,
    pub total_rows: u64,
    pub current_phase: Phase,
    pub worker_progress: Vec<WorkerProgress>,
    pub estimated_time_remaining_ms: Option<u64>,
    pub last_updated: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub job_id: Uuid,
    pub cpu_usage: f32,
    pub memory_usage_bytes: u64,
    pub throughput_rows_per_sec: f64,
    pub worker_count: usize,
    pub timestamp: DateTime<Utc>,
    pub is_processing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    Parallel,
    Sequential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub job_id: Uuid,
    pub processing_mode: ProcessingMode,
    pub worker_count: usize,
    pub avg_cpu_usage: f32,
    pub peak_cpu_usage: f32,
    pub avg_memory_usage_bytes: u64,
    pub peak_memory_usage_bytes: u64,
    pub avg_throughput_rows_per_sec: f64,
    pub peak_throughput_rows_per_sec: f64,
    pub processing_time_ms: u64,
    pub total_rows: u64,
    pub success_count: u64,
    pub error_count: u64,
}

struct JobState {
    total_rows: AtomicU64,
    processed_rows: AtomicU64,
    phase: std::sync::Mutex<Phase>,
    workers: DashMap<String, u64>,
    started_at: DateTime<Utc>,
    samples: std::sync::Mutex<Vec<Metrics>>,
    worker_count: AtomicUsize,
}

/// Per-job progress/metrics state plus a process-wide CPU/RSS sampler.
///
/// One writer per `jobId` (the owning worker), many readers (API handlers),
/// matching the shared resource policy of the system it tracks.
pub struct ProgressTracker {
    jobs: DashMap<Uuid, Arc<JobState>>,
    pid: Pid,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let pid = Pid::from_u32(std::process::id());
        Self { jobs: DashMap::new(), pid }
    }

    pub fn start(&self, job_id: Uuid, total_rows: Option<u64>, worker_count: usize) {
        self.jobs.insert(
            job_id,
            Arc::new(JobState {
                total_rows: AtomicU64::new(total_rows.unwrap_or(0)),
                processed_rows: AtomicU64::new(0),
                phase: std::sync::Mutex::new(Phase::Estimating),
                workers: DashMap::new(),
                started_at: Utc::now(),
                samples: std::sync::Mutex::new(Vec::new()),
                worker_count: AtomicUsize::new(worker_count),
            }),
        );
    }

    pub fn set_worker_count(&self, job_id: Uuid, worker_count: usize) {
        if let Some(state) = self.jobs.get(&job_id) {
            state.worker_count.store(worker_count, Ordering::SeqCst);
        }
    }

    pub fn set_total_rows(&self, job_id: Uuid, total_rows: u64) {
        if let Some(state) = self.jobs.get(&job_id) {
            state.total_rows.store(total_rows, Ordering::SeqCst);
        }
    }

    pub fn set_phase(&self, job_id: Uuid, phase: Phase) {
        if let Some(state) = self.jobs.get(&job_id) {
            *state.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
        }
    }

    pub fn inc_processed(&self, job_id: Uuid, n: u64, worker_id: &str) {
        if let Some(state) = self.jobs.get(&job_id) {
            state.processed_rows.fetch_add(n, Ordering::SeqCst);
            *state.workers.entry(worker_id.to_string()).or_insert(0) += n;
        }
    }

    pub fn snapshot(&self, job_id: Uuid) -> Option<Progress> {
        let state = self.jobs.get(&job_id)?;
        let total = state.total_rows.load(Ordering::SeqCst);
        let processed = state.processed_rows.load(Ordering::SeqCst);
        let phase = *state.phase.lock().unwrap_or_else(|e| e.into_inner());

        let overall_progress = if total == 0 { 0.0 } else { (processed as f64 / total as f64 * 100.0).min(100.0) };

        let elapsed_ms = (Utc::now() - state.started_at).num_milliseconds().max(0) as f64;
        let throughput = if elapsed_ms > 0.0 { processed as f64 / (elapsed_ms / 1000.0) } else { 0.0 };
        let estimated_time_remaining_ms = if throughput > 0.0 && total > processed {
            Some(((total - processed) as f64 / throughput * 1000.0) as u64)
        } else {
            None
        };

        let worker_progress = state
            .workers
            .iter()
            .map(|entry| WorkerProgress { worker_id: entry.key().clone(), processed_rows: *entry.value() })
            .collect();

        Some(Progress {
            job_id,
            overall_progress,
            processed_rows: processed,
            total_rows: total,
            current_phase: phase,
            worker_progress,
            estimated_time_remaining_ms,
            last_updated: Utc::now(),
            started_at: Some(state.started_at),
        })
    }

    /// Samples process CPU/RSS and derives throughput from tracker counters.
    /// Intended to be called at a fixed cadence (default 1 Hz) by a
    /// background task while the job is active; each call appends to the
    /// job's sample window used to build its terminal [`PerformanceReport`].
    pub fn sample_metrics(&self, job_id: Uuid, system: &mut System) -> Option<Metrics> {
        let state = self.jobs.get(&job_id)?;
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        let (cpu_usage, memory_usage_bytes) = system
            .process(self.pid)
            .map(|p| (p.cpu_usage(), p.memory()))
            .unwrap_or((0.0, 0));

        let processed = state.processed_rows.load(Ordering::SeqCst);
        let elapsed_ms = (Utc::now() - state.started_at).num_milliseconds().max(0) as f64;
        let throughput = if elapsed_ms > 0.0 { processed as f64 / (elapsed_ms / 1000.0) } else { 0.0 };

        let metrics = Metrics {
            job_id,
            cpu_usage,
            memory_usage_bytes,
            throughput_rows_per_sec: throughput,
            worker_count: state.worker_count.load(Ordering::SeqCst),
            timestamp: Utc::now(),
            is_processing: !matches!(*state.phase.lock().unwrap_or_else(|e| e.into_inner()), Phase::Completed | Phase::Failed),
        };

        state.samples.lock().unwrap_or_else(|e| e.into_inner()).push(metrics.clone());
        Some(metrics)
    }

    pub fn metrics(&self, job_id: Uuid) -> Option<Metrics> {
        let state = self.jobs.get(&job_id)?;
        state.samples.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }

    /// Builds the terminal report from the accumulated sample window. Called
    /// once at a job's completed/failed transition.
    pub fn report(&self, job_id: Uuid, success_count: u64, error_count: u64) -> Option<PerformanceReport> {
        let state = self.jobs.get(&job_id)?;
        let samples = state.samples.lock().unwrap_or_else(|e| e.into_inner());

        let (avg_cpu, peak_cpu, avg_mem, peak_mem, avg_tp, peak_tp) = if samples.is_empty() {
            (0.0, 0.0, 0, 0, 0.0, 0.0)
        } else {
            let n = samples.len() as f64;
            let avg_cpu = samples.iter().map(|s| s.cpu_usage as f64).sum::<f64>() / n;
            let peak_cpu = samples.iter().map(|s| s.cpu_usage).fold(0.0f32, f32::max);
            let avg_mem = (samples.iter().map(|s| s.memory_usage_bytes as f64).sum::<f64>() / n) as u64;
            let peak_mem = samples.iter().map(|s| s.memory_usage_bytes).max().unwrap_or(0);
            let avg_tp = samples.iter().map(|s| s.throughput_rows_per_sec).sum::<f64>() / n;
            let peak_tp = samples.iter().map(|s| s.throughput_rows_per_sec).fold(0.0f64, f64::max);
            (avg_cpu, peak_cpu, avg_mem, peak_mem, avg_tp, peak_tp)
        };

        let processing_time_ms = (Utc::now() - state.started_at).num_milliseconds().max(0) as u64;
        let worker_count = state.worker_count.load(Ordering::SeqCst);

        Some(PerformanceReport {
            job_id,
            processing_mode: if worker_count > 1 { ProcessingMode::Parallel } else { ProcessingMode::Sequential },
            worker_count,
            avg_cpu_usage: avg_cpu as f32,
            peak_cpu_usage: peak_cpu,
            avg_memory_usage_bytes: avg_mem,
            peak_memory_usage_bytes: peak_mem,
            avg_throughput_rows_per_sec: avg_tp,
            peak_throughput_rows_per_sec: peak_tp,
            processing_time_ms,
            total_rows: state.total_rows.load(Ordering::SeqCst),
            success_count,
            error_count,
        })
    }

    /// Drops in-memory state for a job; called well after terminal
    /// transition once clients have had a chance to poll the final report.
    pub fn evict(&self, job_id: Uuid) {
        self.jobs.remove(&job_id);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reports_overall_progress() {
        let tracker = ProgressTracker::new();
        let job_id = Uuid::new_v4();
        tracker.start(job_id, Some(100), 2);
        tracker.inc_processed(job_id, 25, "worker-0");

        let progress = tracker.snapshot(job_id).unwrap();
        assert_eq!(progress.processed_rows, 25);
        assert_eq!(progress.overall_progress, 25.0);
    }

    #[test]
    fn test_snapshot_missing_job_returns_none() {
        let tracker = ProgressTracker::new();
        assert!(tracker.snapshot(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_report_falls_back_to_sequential_for_single_worker() {
        let tracker = ProgressTracker::new();
        let job_id = Uuid::new_v4();
        tracker.start(job_id, Some(10), 1);
        let report = tracker.report(job_id, 8, 2).unwrap();
        assert_eq!(report.processing_mode, ProcessingMode::Sequential);
        assert_eq!(report.success_count, 8);
        assert_eq!(report.error_count, 2);
    }
}
