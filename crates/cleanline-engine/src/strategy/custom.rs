//! `custom` strategy: delegates to a user-registered predicate keyed by name
//! in the params bag, for validation logic that doesn't fit a built-in
//! strategy.

use super::{Strategy, StrategyContext, StrategyOutcome};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// A hand-written predicate registered under a name and referenced from a
/// `custom` strategy's params as `{"handler": "<name>", ...}`.
pub type CustomHandler = Arc<dyn Fn(&str, &Value) -> StrategyOutcome + Send + Sync>;

fn handlers() -> &'static DashMap<String, CustomHandler> {
    static HANDLERS: OnceLock<DashMap<String, CustomHandler>> = OnceLock::new();
    HANDLERS.get_or_init(DashMap::new)
}

/// Register a custom handler under `name`. Call during process startup,
/// before any row processing begins.
pub fn register_handler(name: impl Into<String>, handler: CustomHandler) {
    handlers().insert(name.into(), handler);
}

#[derive(Debug, Deserialize)]
struct CustomParams {
    handler: String,
}

pub struct CustomStrategy;

impl Strategy for CustomStrategy {
    fn validate(&self, value: &str, params: &Value, _ctx: &StrategyContext<'_>) -> StrategyOutcome {
        let custom_params: CustomParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return StrategyOutcome::err(format!("invalid custom strategy params: {e}")),
        };

        match handlers().get(&custom_params.handler) {
            Some(handler) => handler.value()(value, params),
            None => StrategyOutcome::err(format!("no custom handler registered: {}", custom_params.handler)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_unregistered_handler_fails() {
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "handler": "totally-unregistered-handler" });
        let outcome = CustomStrategy.validate("anything", &params, &context);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_registered_handler_invoked() {
        register_handler(
            "always-even-length",
            Arc::new(|value: &str, _params: &Value| {
                if value.len() % 2 == 0 {
                    StrategyOutcome::ok(value.to_string())
                } else {
                    StrategyOutcome::err("length must be even")
                }
            }),
        );
        let row = BTreeMap::new();
        let context = StrategyContext { row: &row };
        let params = json!({ "handler": "always-even-length" });
        assert!(CustomStrategy.validate("abcd", &params, &context).is_ok());
        assert!(!CustomStrategy.validate("abc", &params, &context).is_ok());
    }
}
