//! Cleanline Engine
//!
//! The rule-driven data cleaning core: the Strategy Registry, the Rule
//! Configuration Store, the Rule Engine that evaluates a row against a
//! configuration, streaming file parsers, the parallel row processor, and
//! spreadsheet export.
//!
//! This crate performs no network or database I/O of its own; the server
//! crate drives it with bytes read from storage and persists its output.
//!
//! # Example
//!
//! ```no_run
//! use cleanline_engine::engine::RuleEngine;
//! use cleanline_engine::rule_config::RuleConfiguration;
//! use cleanline_engine::strategy::registry::StrategyRegistry;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(StrategyRegistry::with_builtins());
//! let config = RuleConfiguration::empty();
//! let engine = RuleEngine::new(registry, &config);
//! ```

pub mod constants;
pub mod engine;
pub mod export;
pub mod parser;
pub mod processor;
pub mod row;
pub mod rule_config;
pub mod strategy;
