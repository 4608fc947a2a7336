//! `range` strategy: validates a numeric value falls within configured bounds.

use super::{Strategy, StrategyContext, StrategyOutcome};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RangeParams {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default = "default_inclusive")]
    inclusive: bool,
}

fn default_inclusive() -> bool {
    true
}

pub struct RangeStrategy;

impl Strategy for RangeStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let params: RangeParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid range params: {e}")),
        };

        let number: f64 = match value.trim().parse() {
            Ok(n) => n,
            Err(_) => return StrategyOutcome::err(format!("\"{value}\" is not numeric")),
        };

        if let Some(min) = params.min {
            let below = if params.inclusive { number < min } else { number <= min };
            if below {
                return StrategyOutcome::err(format!("value {number} is below minimum {min}"));
            }
        }
        if let Some(max) = params.max {
            let above = if params.inclusive { number > max } else { number >= max };
            if above {
                return StrategyOutcome::err(format!("value {number} is above maximum {max}"));
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
    fn test_value_within_bounds() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "min": 0, "max": 120 });
        let outcome = RangeStrategy.validate("35", &params, &context);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_value_above_max_fails() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "min": 0, "max": 120 });
        let outcome = RangeStrategy.validate("150", &params, &context);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_non_numeric_value_fails() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "min": 0, "max": 120 });
        let outcome = RangeStrategy.validate("abc", &params, &context);
        assert!(!outcome.is_ok());
    }
}
