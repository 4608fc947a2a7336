//! Rule Engine: evaluates one row against the active `RuleConfiguration`,
//! producing a `RowOutcome`.

use crate::row::{RawRow, RowError, RowOutcome};
use crate::rule_config::types::{Condition, ConditionOperator, ContinuationPolicy, FieldRule, RuleConfiguration};
use crate::strategy::cache::StrategyCache;
use crate::strategy::registry::StrategyRegistry;
use crate::strategy::{StrategyContext, StrategyOutcome};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Evaluates rows against a `RuleConfiguration` snapshot. Stateless apart
/// from an optional result cache; safe to share across worker threads via
/// `Arc`.
pub struct RuleEngine {
    registry: Arc<StrategyRegistry>,
    cache: Option<StrategyCache>,
}

impl RuleEngine {
    pub fn new(registry: Arc<StrategyRegistry>, config: &RuleConfiguration) -> Self {
        let cache = config
            .global_settings
            .enable_caching
            .then(|| StrategyCache::new(Duration::from_millis(config.global_settings.cache_timeout_ms)));
        Self { registry, cache }
    }

    /// Evaluate `row` against `config`, producing exactly one `RowOutcome`.
    pub fn evaluate_row(&self, row: &RawRow, config: &RuleConfiguration) -> RowOutcome {
        let mut normalized: BTreeMap<String, Option<String>> = row.fields.clone();
        let mut errors: Vec<RowError> = Vec::new();

        for (field, rules) in &config.fields {
            let ordered = sorted_enabled_rules(rules);
            if ordered.is_empty() {
                continue;
            }

            let raw_value = row.get(field);
            let is_empty = row.is_empty_field(field);

            for rule in &ordered {
                if !conditions_hold(&rule.conditions, row) {
                    continue;
                }

                if is_empty {
                    if rule.required {
                        errors.push(RowError {
                            field: field.clone(),
                            rule_name: rule.name.clone(),
                            error_message: rule.error_message.clone(),
                            original_value: None,
                        });
                        if matches!(config.global_settings.continuation_policy, ContinuationPolicy::StopOnFirstError) {
                            break;
                        }
                    }
                    continue;
                }

                let value = raw_value.expect("non-empty field has a value");
                let outcome = self.evaluate_strategy(rule, value, row);

                match outcome {
                    StrategyOutcome::Ok(normalized_value) => {
                        normalized.insert(field.clone(), Some(normalized_value));
                    }
                    StrategyOutcome::Err(_message) => {
                        errors.push(RowError {
                            field: field.clone(),
                            rule_name: rule.name.clone(),
                            error_message: rule.error_message.clone(),
                            original_value: Some(value.to_string()),
                        });
                        if matches!(config.global_settings.continuation_policy, ContinuationPolicy::StopOnFirstError) {
                            break;
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            RowOutcome::Clean {
                row_number: row.row_number,
                normalized,
            }
        } else {
            RowOutcome::Exception {
                row_number: row.row_number,
                original_data: row.fields.clone(),
                errors,
            }
        }
    }

    fn evaluate_strategy(&self, rule: &FieldRule, value: &str, row: &RawRow) -> StrategyOutcome {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&rule.strategy, &rule.params, value) {
                return cached;
            }
        }

        let strategy = match self.registry.resolve(&rule.strategy) {
            Ok(s) => s,
            Err(err) => return StrategyOutcome::err(err.to_string()),
        };

        let ctx = StrategyContext { row: &row.fields };
        let outcome = strategy.validate(value, &rule.params, &ctx);

        if let Some(cache) = &self.cache {
            cache.insert(&rule.strategy, &rule.params, value, outcome.clone());
        }

        outcome
    }
}

fn sorted_enabled_rules(rules: &[FieldRule]) -> Vec<&FieldRule> {
    let mut enabled: Vec<&FieldRule> = rules.iter().filter(|r| r.enabled).collect();
    enabled.sort_by(|a, b| b.priority.cmp(&a.priority));
    enabled
}

fn conditions_hold(conditions: &[Condition], row: &RawRow) -> bool {
    conditions.iter().all(|condition| condition_holds(condition, row))
}

fn condition_holds(condition: &Condition, row: &RawRow) -> bool {
    let field_value = row.get(&condition.field);
    match condition.operator {
        ConditionOperator::IsEmpty => row.is_empty_field(&condition.field),
        ConditionOperator::IsNotEmpty => !row.is_empty_field(&condition.field),
        ConditionOperator::Equals => field_value.map(|v| v == condition.value.as_str().unwrap_or_default()).unwrap_or(false),
        ConditionOperator::NotEquals => field_value.map(|v| v != condition.value.as_str().unwrap_or_default()).unwrap_or(true),
        ConditionOperator::In => condition
            .value
            .as_array()
            .map(|values| {
                field_value
                    .map(|v| values.iter().any(|candidate| candidate.as_str() == Some(v)))
                    .unwrap_or(false)
            })
            .unwrap_or(false),
        ConditionOperator::NotIn => condition
            .value
            .as_array()
            .map(|values| {
                field_value
                    .map(|v| !values.iter().any(|candidate| candidate.as_str() == Some(v)))
                    .unwrap_or(true)
            })
            .unwrap_or(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row_with(field: &str, value: &str) -> RawRow {
        let mut row = RawRow::new(1);
        row.fields.insert(field.to_string(), Some(value.to_string()));
        row
    }

    fn config_with_rule(field: &str, rule: FieldRule) -> RuleConfiguration {
        let mut config = RuleConfiguration::empty();
        config.fields.insert(field.to_string(), vec![rule]);
        config
    }

    #[test]
    fn test_clean_row_passes_through_normalized() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let rule = FieldRule {
            name: "valid-phone".to_string(),
            strategy: "phone".to_string(),
            error_message: "invalid phone".to_string(),
            required: true,
            ..Default::default()
        };
        let config = config_with_rule("phone", rule);
        let engine = RuleEngine::new(registry, &config);
        let row = row_with("phone", "138 0013 8000");

        let outcome = engine.evaluate_row(&row, &config);
        match outcome {
            RowOutcome::Clean { normalized, .. } => {
                assert_eq!(normalized.get("phone"), Some(&Some("13800138000".to_string())));
            }
            RowOutcome::Exception { .. } => panic!("expected clean outcome"),
        }
    }

    #[test]
    fn test_required_empty_field_is_exception() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let rule = FieldRule {
            name: "phone-required".to_string(),
            strategy: "phone".to_string(),
            error_message: "phone is required".to_string(),
            required: true,
            ..Default::default()
        };
        let config = config_with_rule("phone", rule);
        let engine = RuleEngine::new(registry, &config);
        let row = RawRow::new(1);

        let outcome = engine.evaluate_row(&row, &config);
        match outcome {
            RowOutcome::Exception { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].rule_name, "phone-required");
            }
            RowOutcome::Clean { .. } => panic!("expected exception outcome"),
        }
    }

    #[test]
    fn test_invalid_value_becomes_exception() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let rule = FieldRule {
            name: "valid-phone".to_string(),
            strategy: "phone".to_string(),
            error_message: "invalid phone".to_string(),
            required: true,
            ..Default::default()
        };
        let config = config_with_rule("phone", rule);
        let engine = RuleEngine::new(registry, &config);
        let row = row_with("phone", "not-a-phone");

        let outcome = engine.evaluate_row(&row, &config);
        assert!(!outcome.is_clean());
    }

    #[test]
    fn test_condition_skips_rule_when_not_met() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let rule = FieldRule {
            name: "phone-if-domestic".to_string(),
            strategy: "phone".to_string(),
            error_message: "invalid phone".to_string(),
            required: true,
            conditions: vec![Condition {
                field: "country".to_string(),
                operator: ConditionOperator::Equals,
                value: json!("CN"),
            }],
            ..Default::default()
        };
        let mut config = config_with_rule("phone", rule);
        config.fields.get_mut("phone").unwrap()[0].priority = 0;
        let engine = RuleEngine::new(registry, &config);

        let mut row = row_with("phone", "not-a-phone");
        row.fields.insert("country".to_string(), Some("US".to_string()));

        let outcome = engine.evaluate_row(&row, &config);
        assert!(outcome.is_clean());
    }
}
