//! Shapes of a rule configuration as authored by an operator and consumed by
//! the Rule Engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a field rule's evaluation failure (and its peers') affects the rest
/// of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContinuationPolicy {
    /// Stop evaluating further rules on this field after the first failure.
    StopOnFirstError,
    /// Evaluate every rule on the field and collect all failures.
    CollectAll,
}

impl Default for ContinuationPolicy {
    fn default() -> Self {
        ContinuationPolicy::StopOnFirstError
    }
}

/// A single condition gating whether a `FieldRule` applies to a given row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    IsEmpty,
    IsNotEmpty,
}

/// One strategy invocation configured against a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub name: String,
    pub strategy: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub priority: i32,
    pub error_message: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for FieldRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            strategy: String::new(),
            params: Value::Null,
            required: false,
            priority: 0,
            error_message: String::new(),
            conditions: Vec::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default)]
    pub continuation_policy: ContinuationPolicy,
    #[serde(default)]
    pub enable_caching: bool,
    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,
}

fn default_cache_timeout_ms() -> u64 {
    60_000
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            strict_mode: false,
            continuation_policy: ContinuationPolicy::default(),
            enable_caching: false,
            cache_timeout_ms: default_cache_timeout_ms(),
        }
    }
}

/// A complete, versioned set of field rules plus global behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfiguration {
    pub version: u64,
    #[serde(default)]
    pub description: Option<String>,
    /// Field name -> ordered rules for that field.
    pub fields: std::collections::BTreeMap<String, Vec<FieldRule>>,
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

impl RuleConfiguration {
    pub fn empty() -> Self {
        Self {
            version: 0,
            description: None,
            fields: std::collections::BTreeMap::new(),
            global_settings: GlobalSettings::default(),
        }
    }

    /// Rules for `field`, sorted by descending priority then declaration order.
    pub fn rules_for(&self, field: &str) -> Vec<&FieldRule> {
        let mut rules: Vec<&FieldRule> = self
            .fields
            .get(field)
            .map(|rules| rules.iter().filter(|r| r.enabled).collect())
            .unwrap_or_default();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_for_orders_by_priority_descending() {
        let mut config = RuleConfiguration::empty();
        config.fields.insert(
            "phone".to_string(),
            vec![
                FieldRule {
                    name: "low".to_string(),
                    priority: 1,
                    ..Default::default()
                },
                FieldRule {
                    name: "high".to_string(),
                    priority: 10,
                    ..Default::default()
                },
            ],
        );
        let rules = config.rules_for("phone");
        assert_eq!(rules[0].name, "high");
        assert_eq!(rules[1].name, "low");
    }

    #[test]
    fn test_rules_for_skips_disabled() {
        let mut config = RuleConfiguration::empty();
        config.fields.insert(
            "phone".to_string(),
            vec![FieldRule {
                name: "off".to_string(),
                enabled: false,
                ..Default::default()
            }],
        );
        assert!(config.rules_for("phone").is_empty());
    }

    #[test]
    fn test_rules_for_unknown_field_is_empty() {
        let config = RuleConfiguration::empty();
        assert!(config.rules_for("missing").is_empty());
    }
}
