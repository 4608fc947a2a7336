//! `phone` strategy: normalizes and validates Chinese mobile/landline numbers.

use super::{Strategy, StrategyContext, StrategyOutcome};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhoneParams {
    #[serde(default = "default_true")]
    remove_spaces: bool,
    #[serde(default = "default_true")]
    remove_dashes: bool,
    #[serde(default = "default_true")]
    remove_country_code: bool,
    #[serde(default)]
    allow_landline: bool,
}

fn default_true() -> bool {
    true
}

fn mobile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^1[3-9]\d{9}$").expect("static mobile pattern is valid"))
}

fn landline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0\d{2,3}-?\d{7,8}$").expect("static landline pattern is valid"))
}

pub struct PhoneStrategy;

impl Strategy for PhoneStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let params: PhoneParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid phone params: {e}")),
        };

        let mut normalized = value.trim().to_string();
        if params.remove_spaces {
            normalized = normalized.replace(' ', "");
        }
        if params.remove_dashes {
            normalized = normalized.replace('-', "");
        }
        if params.remove_country_code {
            if let Some(stripped) = normalized.strip_prefix("+86") {
                normalized = stripped.to_string();
            } else if let Some(stripped) = normalized.strip_prefix("86") {
                if normalized.len() == 13 {
                    normalized = stripped.to_string();
                }
            }
        }

        if mobile_regex().is_match(&normalized) {
            return StrategyOutcome::ok(normalized);
        }
        if params.allow_landline && landline_regex().is_match(&normalized) {
            return StrategyOutcome::ok(normalized);
        }

        StrategyOutcome::err(format!("\"{value}\" is not a valid phone number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_valid_mobile_number() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = PhoneStrategy.validate("138 0013 8000", &json!({}), &context);
        assert_eq!(outcome, StrategyOutcome::Ok("13800138000".to_string()));
    }

    #[test]
    fn test_country_code_stripped() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = PhoneStrategy.validate("+8613800138000", &json!({}), &context);
        assert_eq!(outcome, StrategyOutcome::Ok("13800138000".to_string()));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = PhoneStrategy.validate("2380013800", &json!({}), &context);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_landline_requires_opt_in() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = PhoneStrategy.validate("010-12345678", &json!({}), &context);
        assert!(!outcome.is_ok());
        let outcome = PhoneStrategy.validate("010-12345678", &json!({ "allowLandline": true }), &context);
        assert!(outcome.is_ok());
    }
}
