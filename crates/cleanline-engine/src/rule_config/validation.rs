//! Structural and semantic validation of a `RuleConfiguration` performed
//! before it is published to the store.

use super::types::{FieldRule, RuleConfiguration};
use crate::constants::{
    MAX_CUSTOM_PARAMS, MAX_ERROR_MESSAGE_LENGTH, MAX_FIELD_RULES, MAX_PRIORITY, MIN_PRIORITY,
};
use crate::strategy::registry::StrategyRegistry;
use crate::strategy::regex_strategy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("field \"{field}\" has {count} rules, exceeding the maximum of {max}")]
    TooManyRules { field: String, count: usize, max: usize },

    #[error("rule \"{rule}\" on field \"{field}\" references unknown strategy \"{strategy}\"")]
    UnknownStrategy {
        field: String,
        rule: String,
        strategy: String,
    },

    #[error("rule \"{rule}\" on field \"{field}\" has priority {priority}, outside [{min}, {max}]")]
    PriorityOutOfRange {
        field: String,
        rule: String,
        priority: i32,
        min: i32,
        max: i32,
    },

    #[error("rule \"{rule}\" on field \"{field}\" has an errorMessage exceeding {max} bytes")]
    ErrorMessageTooLong { field: String, rule: String, max: usize },

    #[error("rule \"{rule}\" on field \"{field}\" has invalid params: {reason}")]
    InvalidParams {
        field: String,
        rule: String,
        reason: String,
    },

    #[error("rule \"{rule}\" on field \"{field}\" has a custom params bag exceeding {max} entries")]
    TooManyCustomParams { field: String, rule: String, max: usize },

    #[error("field \"{field}\" has a duplicate rule name \"{rule}\"")]
    DuplicateRuleName { field: String, rule: String },
}

/// Validates `config` against the registry of known strategies and the
/// configured structural limits. Returns every violation found, rather than
/// stopping at the first one, so an operator sees the full picture.
pub fn validate_configuration(
    config: &RuleConfiguration,
    registry: &StrategyRegistry,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, rules) in &config.fields {
        if rules.len() > MAX_FIELD_RULES {
            errors.push(ValidationError::TooManyRules {
                field: field.clone(),
                count: rules.len(),
                max: MAX_FIELD_RULES,
            });
        }

        let mut seen_names = std::collections::HashSet::new();
        for rule in rules {
            validate_rule(field, rule, registry, &mut errors);
            if !seen_names.insert(rule.name.clone()) {
                errors.push(ValidationError::DuplicateRuleName {
                    field: field.clone(),
                    rule: rule.name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rule(
    field: &str,
    rule: &FieldRule,
    registry: &StrategyRegistry,
    errors: &mut Vec<ValidationError>,
) {
    if !registry.contains(&rule.strategy) {
        errors.push(ValidationError::UnknownStrategy {
            field: field.to_string(),
            rule: rule.name.clone(),
            strategy: rule.strategy.clone(),
        });
        return;
    }

    if rule.priority < MIN_PRIORITY || rule.priority > MAX_PRIORITY {
        errors.push(ValidationError::PriorityOutOfRange {
            field: field.to_string(),
            rule: rule.name.clone(),
            priority: rule.priority,
            min: MIN_PRIORITY,
            max: MAX_PRIORITY,
        });
    }

    if rule.error_message.len() > MAX_ERROR_MESSAGE_LENGTH {
        errors.push(ValidationError::ErrorMessageTooLong {
            field: field.to_string(),
            rule: rule.name.clone(),
            max: MAX_ERROR_MESSAGE_LENGTH,
        });
    }

    if rule.strategy == "regex" {
        if let Err(reason) = regex_strategy::validate_params(&rule.params) {
            errors.push(ValidationError::InvalidParams {
                field: field.to_string(),
                rule: rule.name.clone(),
                reason,
            });
        }
    }

    if rule.strategy == "custom" {
        if let Some(object) = rule.params.as_object() {
            if object.len() > MAX_CUSTOM_PARAMS {
                errors.push(ValidationError::TooManyCustomParams {
                    field: field.to_string(),
                    rule: rule.name.clone(),
                    max: MAX_CUSTOM_PARAMS,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(name: &str, strategy: &str) -> FieldRule {
        FieldRule {
            name: name.to_string(),
            strategy: strategy.to_string(),
            error_message: "invalid".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let registry = StrategyRegistry::with_builtins();
        let mut config = RuleConfiguration::empty();
        config.fields.insert("phone".to_string(), vec![rule("phone-format", "phone")]);
        assert!(validate_configuration(&config, &registry).is_ok());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let registry = StrategyRegistry::with_builtins();
        let mut config = RuleConfiguration::empty();
        config
            .fields
            .insert("phone".to_string(), vec![rule("bad", "not-a-real-strategy")]);
        let errors = validate_configuration(&config, &registry).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnknownStrategy { .. }));
    }

    #[test]
    fn test_duplicate_rule_names_rejected() {
        let registry = StrategyRegistry::with_builtins();
        let mut config = RuleConfiguration::empty();
        config.fields.insert(
            "phone".to_string(),
            vec![rule("same", "phone"), rule("same", "length")],
        );
        let errors = validate_configuration(&config, &registry).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateRuleName { .. })));
    }

    #[test]
    fn test_bad_regex_pattern_rejected() {
        let registry = StrategyRegistry::with_builtins();
        let mut config = RuleConfiguration::empty();
        let mut bad_rule = rule("bad-regex", "regex");
        bad_rule.params = json!({ "pattern": "(unterminated" });
        config.fields.insert("name".to_string(), vec![bad_rule]);
        let errors = validate_configuration(&config, &registry).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidParams { .. })));
    }
}
