//! `regex` strategy: validates (and optionally reformats) a value against a
//! configured pattern.

use super::{Strategy, StrategyContext, StrategyOutcome};
use crate::constants::MAX_REGEX_PATTERN_LENGTH;
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RegexParams {
    pattern: String,
    #[serde(default)]
    flags: Option<String>,
    #[serde(default)]
    multiline: bool,
}

pub struct RegexStrategy;

impl Strategy for RegexStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let params: RegexParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid regex params: {e}")),
        };

        if params.pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return StrategyOutcome::err("regex pattern exceeds maximum length");
        }

        let case_insensitive = params
            .flags
            .as_deref()
            .map(|f| f.contains('i'))
            .unwrap_or(false);

        let regex = match RegexBuilder::new(&params.pattern)
            .case_insensitive(case_insensitive)
            .multi_line(params.multiline)
            .build()
        {
            Ok(r) => r,
            Err(e) => return StrategyOutcome::err(format!("invalid regex pattern: {e}")),
        };

        if regex.is_match(value) {
            StrategyOutcome::ok(value.to_string())
        } else {
            StrategyOutcome::err(format!("value does not match pattern \"{}\"", params.pattern))
        }
    }
}

/// Validates that `params` is a well-formed `regex` strategy config, independent
/// of any row value. Used when a `RuleConfiguration` is loaded/updated.
pub fn validate_params(params: &Value) -> Result<(), String> {
    let params: RegexParams =
        serde_json::from_value(params.clone()).map_err(|e| format!("invalid regex params: {e}"))?;
    if params.pattern.is_empty() {
        return Err("regex pattern must not be empty".to_string());
    }
    if params.pattern.len() > MAX_REGEX_PATTERN_LENGTH {
        return Err("regex pattern exceeds maximum length".to_string());
    }
    RegexBuilder::new(&params.pattern)
        .build()
        .map_err(|e| format!("invalid regex pattern: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn ctx() -> (BTreeMap<String, Option<String>>,) {
        (BTreeMap::new(),)
    }

    #[test]
    fn test_matching_value_passes() {
        let row = ctx().0;
        let context = StrategyContext { row: &row };
        let params = json!({ "pattern": r"^\d{6}$" });
        let outcome = RegexStrategy.validate("138000", &params, &context);
        assert_eq!(outcome, StrategyOutcome::Ok("138000".to_string()));
    }

    #[test]
    fn test_non_matching_value_fails() {
        let row = ctx().0;
        let context = StrategyContext { row: &row };
        let params = json!({ "pattern": r"^\d{6}$" });
        let outcome = RegexStrategy.validate("abc", &params, &context);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_validate_params_rejects_bad_pattern() {
        let params = json!({ "pattern": "(unterminated" });
        assert!(validate_params(&params).is_err());
    }
}
