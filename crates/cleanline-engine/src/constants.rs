//! Limits and tunables referenced throughout the rule engine and config store.

/// Maximum number of `FieldRule`s permitted on a single field.
pub const MAX_FIELD_RULES: usize = 20;

/// Maximum length, in bytes, of a configured `errorMessage`.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

/// Maximum number of entries in a strategy's `custom` params bag.
pub const MAX_CUSTOM_PARAMS: usize = 50;

/// Maximum length of a `regex` strategy's pattern string.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 500;

/// Inclusive bounds for `FieldRule.priority`.
pub const MIN_PRIORITY: i32 = -1000;
pub const MAX_PRIORITY: i32 = 1000;

/// Default result-cache size (entries) when `globalSettings.enableCaching` is set.
pub const MAX_CACHE_SIZE: usize = 10_000;

/// Number of prior `RuleConfiguration` versions retained by the store.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Row count at/above which the Parallel Processor runs in parallel mode.
pub const PARALLEL_PROCESSING_THRESHOLD: usize = 500;

/// Hard ceiling on worker count regardless of configuration or CPU count.
pub const MAX_CONCURRENT_WORKERS: usize = 32;

/// Soft per-row processing ceiling before a row is recorded as a processing-error exception.
pub const MAX_PROCESSING_TIME_MS: u64 = 5_000;

/// Default row-batch size used between parser, processor, and persister stages.
pub const DEFAULT_BATCH_SIZE: usize = 200;
