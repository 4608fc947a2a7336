//! `length` strategy: validates the character length of a value.

use super::{Strategy, StrategyContext, StrategyOutcome};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LengthParams {
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    exact_length: Option<usize>,
}

pub struct LengthStrategy;

impl Strategy for LengthStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let params: LengthParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid length params: {e}")),
        };

        let len = value.chars().count();

        if let Some(exact) = params.exact_length {
            if len != exact {
                return StrategyOutcome::err(format!("expected length {exact}, got {len}"));
            }
            return StrategyOutcome::ok(value.to_string());
        }

        if let Some(min) = params.min_length {
            if len < min {
                return StrategyOutcome::err(format!("length {len} is below minimum {min}"));
            }
        }
        if let Some(max) = params.max_length {
            if len > max {
                return StrategyOutcome::err(format!("length {len} exceeds maximum {max}"));
            }
        }

        StrategyOutcome::ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_within_bounds() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "minLength": 2, "maxLength": 10 });
        assert!(LengthStrategy.validate("abcd", &params, &context).is_ok());
    }

    #[test]
    fn test_exact_length_mismatch() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "exactLength": 18 });
        assert!(!LengthStrategy.validate("12345", &params, &context).is_ok());
    }
}
