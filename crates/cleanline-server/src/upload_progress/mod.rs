//! Upload Progress Tracker: tracks in-flight HTTP body ingestion for the
//! upload endpoint and broadcasts updates to SSE subscribers.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

const COMPLETED_EXPIRY: chrono::Duration = chrono::Duration::minutes(5);
const FAILED_EXPIRY: chrono::Duration = chrono::Duration::minutes(1);
const STALE_EXPIRY: chrono::Duration = chrono::Duration::minutes(10);
const BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadProgress {
    pub upload_id: Uuid,
    pub file_name: String,
    pub total_size: u64,
    pub uploaded_size: u64,
    pub progress: f64,
    pub speed_bytes_per_sec: f64,
    pub start_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    pub status: UploadStatus,
    #[serde(skip)]
    error: Option<String>,
}

struct Entry {
    progress: UploadProgress,
    sender: broadcast::Sender<UploadProgress>,
}

/// Tracks in-flight upload byte counts and fans updates out over a
/// per-upload broadcast channel that the SSE route subscribes to.
pub struct UploadProgressTracker {
    uploads: DashMap<Uuid, Entry>,
}

impl UploadProgressTracker {
    pub fn new() -> Self {
        Self { uploads: DashMap::new() }
    }

    pub fn start_tracking(&self, upload_id: Uuid, file_name: String, total_size: u64) {
        let now = Utc::now();
        let progress = UploadProgress {
            upload_id,
            file_name,
            total_size,
            uploaded_size: 0,
            progress: 0.0,
            speed_bytes_per_sec: 0.0,
            start_time: now,
            last_update_time: now,
            status: UploadStatus::Uploading,
            error: None,
        };
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        self.uploads.insert(upload_id, Entry { progress, sender });
    }

    pub fn update_progress(&self, upload_id: Uuid, uploaded_size: u64) {
        if let Some(mut entry) = self.uploads.get_mut(&upload_id) {
            let now = Utc::now();
            let delta_ms = (now - entry.progress.last_update_time).num_milliseconds().max(1) as f64;
            let delta_bytes = uploaded_size.saturating_sub(entry.progress.uploaded_size) as f64;

            entry.progress.speed_bytes_per_sec = (delta_bytes / delta_ms * 1000.0).round();
            entry.progress.uploaded_size = uploaded_size;
            entry.progress.progress = if entry.progress.total_size == 0 {
                0.0
            } else {
                (uploaded_size as f64 / entry.progress.total_size as f64 * 100.0).min(100.0)
            };
            entry.progress.last_update_time = now;

            let _ = entry.sender.send(entry.progress.clone());
        }
    }

    pub fn complete_upload(&self, upload_id: Uuid) {
        if let Some(mut entry) = self.uploads.get_mut(&upload_id) {
            entry.progress.status = UploadStatus::Completed;
            entry.progress.progress = 100.0;
            entry.progress.last_update_time = Utc::now();
            let _ = entry.sender.send(entry.progress.clone());
        }
    }

    pub fn fail_upload(&self, upload_id: Uuid, error: String) {
        if let Some(mut entry) = self.uploads.get_mut(&upload_id) {
            entry.progress.status = UploadStatus::Failed;
            entry.progress.error = Some(error);
            entry.progress.last_update_time = Utc::now();
            let _ = entry.sender.send(entry.progress.clone());
        }
    }

    pub fn get_progress(&self, upload_id: Uuid) -> Option<UploadProgress> {
        self.uploads.get(&upload_id).map(|e| e.progress.clone())
    }

    pub fn get_all_active(&self) -> Vec<UploadProgress> {
        self.uploads
            .iter()
            .filter(|e| e.progress.status == UploadStatus::Uploading)
            .map(|e| e.progress.clone())
            .collect()
    }

    /// Subscribes to live updates for one upload; used by the SSE route.
    pub fn subscribe(&self, upload_id: Uuid) -> Option<broadcast::Receiver<UploadProgress>> {
        self.uploads.get(&upload_id).map(|e| e.sender.subscribe())
    }

    /// Drops entries past their auto-expiry window. Intended to run on a
    /// periodic background tick alongside the queue's `reclaim_expired`.
    pub fn sweep_expired(&self) {
        let now = Utc::now();
        self.uploads.retain(|_, entry| {
            let age = now - entry.progress.last_update_time;
            match entry.progress.status {
                UploadStatus::Completed => age < COMPLETED_EXPIRY,
                UploadStatus::Failed => age < FAILED_EXPIRY,
                UploadStatus::Uploading => age < STALE_EXPIRY,
            }
        });
    }
}

impl Default for UploadProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedUploadProgressTracker = Arc<UploadProgressTracker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_progress_computes_percentage() {
        let tracker = UploadProgressTracker::new();
        let id = Uuid::new_v4();
        tracker.start_tracking(id, "data.csv".to_string(), 1000);
        tracker.update_progress(id, 500);

        let progress = tracker.get_progress(id).unwrap();
        assert_eq!(progress.progress, 50.0);
        assert_eq!(progress.status, UploadStatus::Uploading);
    }

    #[test]
    fn test_complete_upload_sets_full_progress() {
        let tracker = UploadProgressTracker::new();
        let id = Uuid::new_v4();
        tracker.start_tracking(id, "data.csv".to_string(), 1000);
        tracker.complete_upload(id);

        let progress = tracker.get_progress(id).unwrap();
        assert_eq!(progress.status, UploadStatus::Completed);
        assert_eq!(progress.progress, 100.0);
    }

    #[test]
    fn test_get_all_active_excludes_completed() {
        let tracker = UploadProgressTracker::new();
        let active = Uuid::new_v4();
        let done = Uuid::new_v4();
        tracker.start_tracking(active, "a.csv".to_string(), 100);
        tracker.start_tracking(done, "b.csv".to_string(), 100);
        tracker.complete_upload(done);

        let all_active = tracker.get_all_active();
        assert_eq!(all_active.len(), 1);
        assert_eq!(all_active[0].upload_id, active);
    }
}
