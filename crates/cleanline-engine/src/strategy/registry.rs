//! Registry of named strategies, resolved by the Rule Engine at evaluation time.

use super::{
    address::AddressStrategy, custom::CustomStrategy, date::DateStrategy, length::LengthStrategy,
    phone::PhoneStrategy, range::RangeStrategy, regex_strategy::RegexStrategy, Strategy,
};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("strategy not found: {0}")]
    NotFound(String),
}

/// Holds validator/normalizer strategies keyed by name. Built-in strategies
/// are registered at construction; additional `custom` strategies may be
/// registered by name at process start. Read-only after startup.
pub struct StrategyRegistry {
    strategies: DashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Construct a registry pre-populated with the built-in strategies.
    pub fn with_builtins() -> Self {
        let registry = Self {
            strategies: DashMap::new(),
        };
        registry.register("regex", Arc::new(RegexStrategy));
        registry.register("range", Arc::new(RangeStrategy));
        registry.register("length", Arc::new(LengthStrategy));
        registry.register("phone", Arc::new(PhoneStrategy));
        registry.register("date", Arc::new(DateStrategy));
        registry.register("address", Arc::new(AddressStrategy));
        registry.register("custom", Arc::new(CustomStrategy));
        registry
    }

    pub fn register(&self, name: impl Into<String>, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(name.into(), strategy);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Strategy>, RegistryError> {
        self.strategies
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn list(&self) -> Vec<String> {
        self.strategies.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_resolvable() {
        let registry = StrategyRegistry::with_builtins();
        for name in ["regex", "range", "length", "phone", "date", "address", "custom"] {
            assert!(registry.resolve(name).is_ok(), "expected {name} to resolve");
        }
    }

    #[test]
    fn test_unknown_strategy_not_found() {
        let registry = StrategyRegistry::with_builtins();
        assert!(matches!(
            registry.resolve("does-not-exist"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_contains_all_builtins() {
        let registry = StrategyRegistry::with_builtins();
        let names = registry.list();
        assert_eq!(names.len(), 7);
    }
}
