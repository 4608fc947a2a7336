//! Optional result cache sitting in front of strategy evaluation, keyed by
//! `(strategy name, params, value)`. Entries are immutable once inserted;
//! eviction happens only on expiry or when the configured size cap is hit.

use super::StrategyOutcome;
use crate::constants::MAX_CACHE_SIZE;
use dashmap::DashMap;
use serde_json::Value;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    strategy_name: String,
    params_hash: u64,
    value: String,
}

struct CacheEntry {
    outcome: StrategyOutcome,
    inserted_at: Instant,
}

/// A bounded, TTL-expiring cache of strategy evaluation results. Safe to
/// share across worker threads; never mutated in place, only
/// inserted-or-overwritten.
pub struct StrategyCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl StrategyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: MAX_CACHE_SIZE,
        }
    }

    fn key(strategy_name: &str, params: &Value, value: &str) -> CacheKey {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        params.to_string().hash(&mut hasher);
        CacheKey {
            strategy_name: strategy_name.to_string(),
            params_hash: hasher.finish(),
            value: value.to_string(),
        }
    }

    pub fn get(&self, strategy_name: &str, params: &Value, value: &str) -> Option<StrategyOutcome> {
        let key = Self::key(strategy_name, params, value);
        let entry = self.entries.get(&key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&key);
            return None;
        }
        Some(entry.outcome.clone())
    }

    pub fn insert(&self, strategy_name: &str, params: &Value, value: &str, outcome: StrategyOutcome) {
        if self.entries.len() >= self.max_entries {
            // Cheap bounded eviction: drop an arbitrary entry rather than
            // tracking LRU order under contention.
            if let Some(evict) = self.entries.iter().next().map(|e| e.key().clone()) {
                self.entries.remove(&evict);
            }
        }
        let key = Self::key(strategy_name, params, value);
        self.entries.insert(
            key,
            CacheEntry {
                outcome,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_then_get_hits() {
        let cache = StrategyCache::new(Duration::from_secs(60));
        let params = json!({ "pattern": "^a+$" });
        cache.insert("regex", &params, "aaa", StrategyOutcome::ok("aaa"));
        let hit = cache.get("regex", &params, "aaa");
        assert_eq!(hit, Some(StrategyOutcome::ok("aaa")));
    }

    #[test]
    fn test_distinct_values_miss() {
        let cache = StrategyCache::new(Duration::from_secs(60));
        let params = json!({ "pattern": "^a+$" });
        cache.insert("regex", &params, "aaa", StrategyOutcome::ok("aaa"));
        assert_eq!(cache.get("regex", &params, "bbb"), None);
    }

    #[test]
    fn test_expired_entry_misses() {
        let cache = StrategyCache::new(Duration::from_millis(0));
        let params = json!({});
        cache.insert("regex", &params, "x", StrategyOutcome::ok("x"));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("regex", &params, "x"), None);
    }
}
