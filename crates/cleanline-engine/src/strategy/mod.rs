//! Strategy Registry: pure, named validator/normalizer functions resolved by
//! field rule name and invoked by the Rule Engine.
//!
//! A strategy never performs I/O and never depends on wall-clock time, except
//! `date`, which may use an explicitly configured timezone.

pub mod address;
pub mod cache;
pub mod custom;
pub mod date;
pub mod length;
pub mod phone;
pub mod range;
pub mod registry;
pub mod regex_strategy;

use serde_json::Value;
use std::collections::BTreeMap;

/// Context passed to a strategy: the already-read fields of the row being
/// evaluated, so a strategy can (in principle) be condition-aware. Strategies
/// currently only use this for read access, never mutation.
pub struct StrategyContext<'a> {
    pub row: &'a BTreeMap<String, Option<String>>,
}

/// Outcome of validating/normalizing a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Ok(String),
    Err(String),
}

impl StrategyOutcome {
    pub fn ok(value: impl Into<String>) -> Self {
        StrategyOutcome::Ok(value.into())
    }

    pub fn err(message: impl Into<String>) -> Self {
        StrategyOutcome::Err(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StrategyOutcome::Ok(_))
    }
}

/// A single named validator/normalizer. `value` is guaranteed non-empty by
/// the caller (the Rule Engine handles required/empty-field logic itself).
pub trait Strategy: Send + Sync {
    fn validate(&self, value: &str, params: &Value, ctx: &StrategyContext<'_>) -> StrategyOutcome;
}

/// Strategy-level validation error surfaced while validating a `RuleConfiguration`
/// (as opposed to a `StrategyOutcome::Err`, which is a per-row validation failure).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StrategyParamError {
    #[error("{0}")]
    Invalid(String),
}
