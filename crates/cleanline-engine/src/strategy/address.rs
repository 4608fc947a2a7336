//! `address` strategy: light structural validation of a free-text address.

use super::{Strategy, StrategyContext, StrategyOutcome};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressParams {
    #[serde(default)]
    require_province: bool,
    #[serde(default)]
    require_city: bool,
    #[serde(default)]
    require_district: bool,
    #[serde(default)]
    validate_components: bool,
}

const PROVINCE_SUFFIXES: &[&str] = &["省", "自治区", "市"];
const CITY_SUFFIXES: &[&str] = &["市", "州", "盟"];
const DISTRICT_SUFFIXES: &[&str] = &["区", "县", "市", "旗"];

fn has_suffix(value: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| value.contains(s))
}

pub struct AddressStrategy;

impl Strategy for AddressStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let params: AddressParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid address params: {e}")),
        };

        let trimmed = value.trim();
        if trimmed.chars().count() < 4 {
            return StrategyOutcome::err("address is too short to be meaningful");
        }

        if params.validate_components || params.require_province {
            if params.require_province && !has_suffix(trimmed, PROVINCE_SUFFIXES) {
                return StrategyOutcome::err("address is missing a recognizable province");
            }
        }
        if params.require_city && !has_suffix(trimmed, CITY_SUFFIXES) {
            return StrategyOutcome::err("address is missing a recognizable city");
        }
        if params.require_district && !has_suffix(trimmed, DISTRICT_SUFFIXES) {
            return StrategyOutcome::err("address is missing a recognizable district");
        }

        StrategyOutcome::ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_plain_address_passes_without_requirements() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = AddressStrategy.validate("Main Street 123", &json!({}), &context);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_missing_province_fails_when_required() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "requireProvince": true });
        let outcome = AddressStrategy.validate("Main Street 123", &params, &context);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_full_address_with_all_components() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "requireProvince": true, "requireCity": true, "requireDistrict": true });
        let outcome = AddressStrategy.validate("广东省广州市天河区某街道1号", &params, &context);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_too_short_address_fails() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let outcome = AddressStrategy.validate("abc", &json!({}), &context);
        assert!(!outcome.is_ok());
    }
}
