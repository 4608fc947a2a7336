//! `date` strategy: parses a value against one of several accepted formats and
//! normalizes it to `YYYY-MM-DD`.

use super::{Strategy, StrategyContext, StrategyOutcome};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateParams {
    #[serde(default = "default_formats")]
    formats: Vec<String>,
    #[serde(default)]
    min_year: Option<i32>,
    #[serde(default)]
    max_year: Option<i32>,
}

fn default_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d".to_string(),
        "%Y/%m/%d".to_string(),
        "%Y.%m.%d".to_string(),
        "%d/%m/%Y".to_string(),
    ]
}

pub struct DateStrategy;

impl Strategy for DateStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let params: DateParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid date params: {e}")),
        };

        let trimmed = value.trim();
        let parsed = params
            .formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok());

        let date = match parsed {
            Some(d) => d,
            None => return StrategyOutcome::err(format!("\"{value}\" does not match any accepted date format")),
        };

        let year = date.year();
        if let Some(min_year) = params.min_year {
            if year < min_year {
                return StrategyOutcome::err(format!("year {year} is before minimum {min_year}"));
            }
        }
        if let Some(max_year) = params.max_year {
            if year > max_year {
                return StrategyOutcome::err(format!("year {year} is after maximum {max_year}"));
            }
        }

        StrategyOutcome::ok(date.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_slash_format_normalized() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = DateStrategy.validate("2024/03/15", &json!({}), &context);
        assert_eq!(outcome, StrategyOutcome::Ok("2024-03-15".to_string()));
    }

    #[test]
    fn test_unparseable_value_fails() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = DateStrategy.validate("not-a-date", &json!({}), &context);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_year_out_of_range_fails() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "minYear": 1900, "maxYear": 2100 });
        let outcome = DateStrategy.validate("1850-01-01", &params, &context);
        assert!(!outcome.is_ok());
    }
}
