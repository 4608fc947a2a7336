//! Versioned, hot-reloadable holder of the active `RuleConfiguration`.
//!
//! Readers (the Rule Engine, one per worker) take a cheap `Arc` snapshot and
//! never block a writer; a reload swaps the snapshot and pushes the previous
//! one onto a bounded history ring, never mutating a configuration in place.

use super::types::RuleConfiguration;
use super::validation::{validate_configuration, ValidationError};
use crate::constants::DEFAULT_HISTORY_CAPACITY;
use crate::strategy::registry::StrategyRegistry;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("configuration failed validation: {0:?}")]
    Invalid(Vec<ValidationError>),

    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to install file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("requested version {0} is not present in history")]
    VersionNotFound(u64),
}

struct Inner {
    current: Arc<RuleConfiguration>,
    history: VecDeque<Arc<RuleConfiguration>>,
}

/// Thread-safe store of the active configuration plus a bounded undo history.
/// Cloning the returned `Arc<RuleConfiguration>` from `current()` is the only
/// way callers observe state; the store itself is never cloned.
pub struct RuleConfigStore {
    inner: RwLock<Arc<Inner>>,
    registry: Arc<StrategyRegistry>,
    history_capacity: usize,
}

impl RuleConfigStore {
    pub fn new(initial: RuleConfiguration, registry: Arc<StrategyRegistry>) -> Result<Self, StoreError> {
        validate_configuration(&initial, &registry).map_err(StoreError::Invalid)?;
        Ok(Self {
            inner: RwLock::new(Arc::new(Inner {
                current: Arc::new(initial),
                history: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            })),
            registry,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        })
    }

    pub fn load_from_file(path: impl AsRef<Path>, registry: Arc<StrategyRegistry>) -> Result<Self, StoreError> {
        let config = read_config_file(path.as_ref())?;
        Self::new(config, registry)
    }

    /// Current configuration, shared via a reference-counted snapshot.
    pub fn current(&self) -> Arc<RuleConfiguration> {
        let guard = self.inner.read().expect("rule config lock poisoned");
        guard.current.clone()
    }

    pub fn current_version(&self) -> u64 {
        self.inner.read().expect("rule config lock poisoned").current.version
    }

    /// Atomically replace the active configuration. Rejects the update
    /// (leaving the store unchanged) if the new configuration fails
    /// validation.
    pub fn update(&self, new_config: RuleConfiguration) -> Result<(), StoreError> {
        validate_configuration(&new_config, &self.registry).map_err(StoreError::Invalid)?;

        let mut guard = self.inner.write().expect("rule config lock poisoned");
        let previous = guard.current.clone();
        let mut history = guard.history.clone();
        history.push_front(previous);
        history.truncate(self.history_capacity);

        *guard = Arc::new(Inner {
            current: Arc::new(new_config),
            history,
        });
        info!(version = guard.current.version, "rule configuration updated");
        Ok(())
    }

    /// Roll back to a specific historical version, pushing the current
    /// configuration onto history in its place.
    pub fn rollback_to(&self, version: u64) -> Result<(), StoreError> {
        let mut guard = self.inner.write().expect("rule config lock poisoned");
        let position = guard
            .history
            .iter()
            .position(|c| c.version == version)
            .ok_or(StoreError::VersionNotFound(version))?;
        let target = guard.history[position].clone();
        let mut history = guard.history.clone();
        let previous_current = guard.current.clone();
        history.remove(position);
        history.push_front(previous_current);
        history.truncate(self.history_capacity);

        *guard = Arc::new(Inner {
            current: target,
            history,
        });
        info!(version = guard.current.version, "rule configuration rolled back");
        Ok(())
    }

    pub fn history_versions(&self) -> Vec<u64> {
        self.inner
            .read()
            .expect("rule config lock poisoned")
            .history
            .iter()
            .map(|c| c.version)
            .collect()
    }

    pub fn reload_from_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let config = read_config_file(path.as_ref())?;
        self.update(config)
    }

    /// Install a file watch on `path`, reloading `store` whenever the file is
    /// modified. Takes `store` behind an `Arc` so the watcher's background
    /// thread can hold a strong reference without borrowing past the return
    /// of this function. Watch errors are logged, never fatal: the store
    /// keeps serving the last good configuration.
    pub fn watch_file(store: Arc<Self>, path: impl Into<PathBuf>) -> Result<RecommendedWatcher, StoreError> {
        let path = path.into();
        let watch_path = path.clone();
        let watched_store = store.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| match event {
            Ok(event) if event.kind.is_modify() => match watched_store.reload_from_file(&watch_path) {
                Ok(()) => info!(path = %watch_path.display(), "rule configuration reloaded"),
                Err(err) => warn!(path = %watch_path.display(), error = %err, "rule configuration reload failed"),
            },
            Ok(_) => {}
            Err(err) => warn!(error = %err, "rule config file watch error"),
        })?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        Ok(watcher)
    }
}

fn read_config_file(path: &Path) -> Result<RuleConfiguration, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_config::types::FieldRule;

    fn registry() -> Arc<StrategyRegistry> {
        Arc::new(StrategyRegistry::with_builtins())
    }

    #[test]
    fn test_new_store_rejects_invalid_config() {
        let mut config = RuleConfiguration::empty();
        config.fields.insert(
            "phone".to_string(),
            vec![FieldRule {
                name: "bad".to_string(),
                strategy: "not-real".to_string(),
                error_message: "x".to_string(),
                ..Default::default()
            }],
        );
        assert!(RuleConfigStore::new(config, registry()).is_err());
    }

    #[test]
    fn test_update_pushes_history() {
        let store = RuleConfigStore::new(RuleConfiguration::empty(), registry()).unwrap();
        let mut next = RuleConfiguration::empty();
        next.version = 1;
        store.update(next).unwrap();
        assert_eq!(store.current_version(), 1);
        assert_eq!(store.history_versions(), vec![0]);
    }

    #[test]
    fn test_rollback_restores_prior_version() {
        let store = RuleConfigStore::new(RuleConfiguration::empty(), registry()).unwrap();
        let mut v1 = RuleConfiguration::empty();
        v1.version = 1;
        store.update(v1).unwrap();
        let mut v2 = RuleConfiguration::empty();
        v2.version = 2;
        store.update(v2).unwrap();

        store.rollback_to(0).unwrap();
        assert_eq!(store.current_version(), 0);
        assert!(store.history_versions().contains(&2));
    }

    #[test]
    fn test_rollback_unknown_version_errors() {
        let store = RuleConfigStore::new(RuleConfiguration::empty(), registry()).unwrap();
        assert!(matches!(store.rollback_to(999), Err(StoreError::VersionNotFound(999))));
    }
}
