//! HTTP-facing wrapper over [`cleanline_engine::rule_config::RuleConfigStore`]:
//! read/update/reload/history/stats, each rendered in the
//! `{success, configuration?, message?, error?}` envelope the rule-config
//! routes share.

use chrono::{DateTime, Utc};
use cleanline_engine::rule_config::{RuleConfigStore, RuleConfiguration, StoreError};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct RuleConfigResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<RuleConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuleConfigResponse {
    pub fn ok(configuration: RuleConfiguration, message: impl Into<String>) -> Self {
        Self { success: true, configuration: Some(configuration), message: Some(message.into()), error: None }
    }

    pub fn err(error: &StoreError) -> Self {
        Self { success: false, configuration: None, message: None, error: Some(error.to_string()) }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<u64>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ConfigStatsResponse {
    pub current_version: u64,
    pub history_size: usize,
    pub total_fields: usize,
    pub total_rules: usize,
    pub last_updated: DateTime<Utc>,
    pub is_initialized: bool,
}

pub fn current(store: &RuleConfigStore) -> RuleConfigResponse {
    RuleConfigResponse::ok((*store.current()).clone(), "active configuration")
}

pub fn update(store: &RuleConfigStore, new_config: RuleConfiguration) -> RuleConfigResponse {
    match store.update(new_config) {
        Ok(()) => RuleConfigResponse::ok((*store.current()).clone(), "configuration updated"),
        Err(err) => RuleConfigResponse::err(&err),
    }
}

pub fn reload(store: &RuleConfigStore, path: &str) -> RuleConfigResponse {
    match store.reload_from_file(path) {
        Ok(()) => RuleConfigResponse::ok((*store.current()).clone(), "configuration reloaded"),
        Err(err) => RuleConfigResponse::err(&err),
    }
}

pub fn history(store: &RuleConfigStore, limit: Option<usize>) -> HistoryResponse {
    let mut versions = store.history_versions();
    if let Some(limit) = limit {
        versions.truncate(limit);
    }
    let total = versions.len();
    HistoryResponse { history: versions, total }
}

pub fn stats(store: &RuleConfigStore) -> ConfigStatsResponse {
    let config = store.current();
    let total_rules = config.fields.values().map(|rules| rules.len()).sum();

    ConfigStatsResponse {
        current_version: config.version,
        history_size: store.history_versions().len(),
        total_fields: config.fields.len(),
        total_rules,
        last_updated: Utc::now(),
        is_initialized: true,
    }
}

pub type SharedRuleConfigStore = Arc<RuleConfigStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use cleanline_engine::strategy::registry::StrategyRegistry;

    fn store() -> RuleConfigStore {
        RuleConfigStore::new(RuleConfiguration::empty(), Arc::new(StrategyRegistry::with_builtins())).unwrap()
    }

    #[test]
    fn test_current_returns_active_configuration() {
        let store = store();
        let response = current(&store);
        assert!(response.success);
        assert_eq!(response.configuration.unwrap().version, 0);
    }

    #[test]
    fn test_stats_reports_field_and_rule_counts() {
        let store = store();
        let stats = stats(&store);
        assert_eq!(stats.current_version, 0);
        assert_eq!(stats.total_fields, 0);
        assert!(stats.is_initialized);
    }

    #[test]
    fn test_update_rejects_invalid_configuration() {
        let store = store();
        let mut bad = RuleConfiguration::empty();
        bad.fields.insert(
            "phone".to_string(),
            vec![cleanline_engine::rule_config::FieldRule {
                strategy: "not-real".to_string(),
                ..Default::default()
            }],
        );
        let response = update(&store, bad);
        assert!(!response.success);
        assert!(response.error.is_some());
    }
}
