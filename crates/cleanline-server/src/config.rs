//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/cleanline";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default queue task visibility timeout (ms) before an unacknowledged lease expires.
pub const DEFAULT_QUEUE_TASK_TIMEOUT_MS: u64 = 1_800_000;

/// Default max retry attempts before a task moves to the dead-letter list.
pub const DEFAULT_QUEUE_MAX_RETRY_ATTEMPTS: u32 = 3;

/// Default base backoff (ms) for exponential retry backoff.
pub const DEFAULT_QUEUE_BASE_BACKOFF_MS: u64 = 1_000;

/// Default max backoff (ms), capping exponential growth.
pub const DEFAULT_QUEUE_MAX_BACKOFF_MS: u64 = 60_000;

/// Default heartbeat interval (ms) a worker uses to extend a task's lease.
pub const DEFAULT_QUEUE_HEARTBEAT_INTERVAL_MS: u64 = 10_000;

/// Default rule configuration file path.
pub const DEFAULT_RULE_CONFIG_FILE_PATH: &str = "./config/rules.json";

/// Default number of prior rule configuration versions retained for rollback.
pub const DEFAULT_RULE_CONFIG_HISTORY_CAPACITY: usize = 10;

/// Default number of rows parsed into memory per batch.
pub const DEFAULT_PARSE_BATCH_SIZE: usize = 1_000;

/// Default number of rows persisted per batched insert.
pub const DEFAULT_STORE_BATCH_SIZE: usize = 500;

/// Default maximum upload size, 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub queue: QueueConfig,
    pub rule_config_store: RuleConfigStoreConfig,
    pub processing: ProcessingConfig,
    pub upload: UploadConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Work queue timing/retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub task_timeout_ms: u64,
    pub max_retry_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub heartbeat_interval_ms: u64,
}

impl QueueConfig {
    /// The visibility timeout a lease is granted for, derived from `task_timeout_ms`.
    pub fn visibility_timeout_ms(&self) -> u64 {
        self.task_timeout_ms
    }
}

/// Rule configuration store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfigStoreConfig {
    pub config_file_path: String,
    pub history_capacity: usize,
}

/// Row-processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub parse_batch_size: usize,
    pub store_batch_size: usize,
    pub max_concurrent_workers: usize,
    pub parallel_processing_threshold: usize,
    pub max_processing_time_ms: u64,
}

/// Upload acceptance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub allowed_mime_types: Vec<String>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("CLEANLINE_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("CLEANLINE_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("CLEANLINE_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
            queue: QueueConfig {
                task_timeout_ms: std::env::var("QUEUE_TASK_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_QUEUE_TASK_TIMEOUT_MS),
                max_retry_attempts: std::env::var("QUEUE_MAX_RETRY_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_QUEUE_MAX_RETRY_ATTEMPTS),
                base_backoff_ms: std::env::var("QUEUE_BASE_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_QUEUE_BASE_BACKOFF_MS),
                max_backoff_ms: std::env::var("QUEUE_MAX_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_QUEUE_MAX_BACKOFF_MS),
                heartbeat_interval_ms: std::env::var("QUEUE_HEARTBEAT_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_QUEUE_HEARTBEAT_INTERVAL_MS),
            },
            rule_config_store: RuleConfigStoreConfig {
                config_file_path: std::env::var("RULE_CONFIG_FILE_PATH")
                    .unwrap_or_else(|_| DEFAULT_RULE_CONFIG_FILE_PATH.to_string()),
                history_capacity: std::env::var("RULE_CONFIG_HISTORY_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RULE_CONFIG_HISTORY_CAPACITY),
            },
            processing: ProcessingConfig {
                parse_batch_size: std::env::var("PROCESSING_PARSE_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PARSE_BATCH_SIZE),
                store_batch_size: std::env::var("PROCESSING_STORE_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_STORE_BATCH_SIZE),
                max_concurrent_workers: std::env::var("PROCESSING_MAX_CONCURRENT_WORKERS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(cleanline_engine::constants::MAX_CONCURRENT_WORKERS),
                parallel_processing_threshold: std::env::var("PROCESSING_PARALLEL_THRESHOLD")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(cleanline_engine::constants::PARALLEL_PROCESSING_THRESHOLD),
                max_processing_time_ms: std::env::var("PROCESSING_MAX_TIME_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(cleanline_engine::constants::MAX_PROCESSING_TIME_MS),
            },
            upload: UploadConfig {
                max_file_size_bytes: std::env::var("UPLOAD_MAX_FILE_SIZE_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES),
                allowed_extensions: std::env::var("UPLOAD_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| "csv,xlsx,xls".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allowed_mime_types: std::env::var("UPLOAD_ALLOWED_MIME_TYPES")
                    .unwrap_or_else(|_| {
                        "text/csv,application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,application/vnd.ms-excel"
                            .to_string()
                    })
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if self.queue.max_retry_attempts == 0 {
            anyhow::bail!("Queue max_retry_attempts must be greater than 0");
        }

        if self.queue.base_backoff_ms > self.queue.max_backoff_ms {
            anyhow::bail!(
                "Queue base_backoff_ms ({}) cannot be greater than max_backoff_ms ({})",
                self.queue.base_backoff_ms,
                self.queue.max_backoff_ms
            );
        }

        if self.rule_config_store.config_file_path.is_empty() {
            anyhow::bail!("Rule configuration file path cannot be empty");
        }

        if self.processing.max_concurrent_workers == 0 {
            anyhow::bail!("Processing max_concurrent_workers must be greater than 0");
        }

        if self.upload.max_file_size_bytes == 0 {
            anyhow::bail!("Upload max_file_size_bytes must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            queue: QueueConfig {
                task_timeout_ms: DEFAULT_QUEUE_TASK_TIMEOUT_MS,
                max_retry_attempts: DEFAULT_QUEUE_MAX_RETRY_ATTEMPTS,
                base_backoff_ms: DEFAULT_QUEUE_BASE_BACKOFF_MS,
                max_backoff_ms: DEFAULT_QUEUE_MAX_BACKOFF_MS,
                heartbeat_interval_ms: DEFAULT_QUEUE_HEARTBEAT_INTERVAL_MS,
            },
            rule_config_store: RuleConfigStoreConfig {
                config_file_path: DEFAULT_RULE_CONFIG_FILE_PATH.to_string(),
                history_capacity: DEFAULT_RULE_CONFIG_HISTORY_CAPACITY,
            },
            processing: ProcessingConfig {
                parse_batch_size: DEFAULT_PARSE_BATCH_SIZE,
                store_batch_size: DEFAULT_STORE_BATCH_SIZE,
                max_concurrent_workers: cleanline_engine::constants::MAX_CONCURRENT_WORKERS,
                parallel_processing_threshold: cleanline_engine::constants::PARALLEL_PROCESSING_THRESHOLD,
                max_processing_time_ms: cleanline_engine::constants::MAX_PROCESSING_TIME_MS,
            },
            upload: UploadConfig {
                max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
                allowed_extensions: vec!["csv".to_string(), "xlsx".to_string(), "xls".to_string()],
                allowed_mime_types: vec![
                    "text/csv".to_string(),
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
                    "application/vnd.ms-excel".to_string(),
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_greater_than_max_connections_rejected() {
        let mut config = Config::default();
        config.database.min_connections = config.database.max_connections + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_backoff_greater_than_max_rejected() {
        let mut config = Config::default();
        config.queue.base_backoff_ms = config.queue.max_backoff_ms + 1;
        assert!(config.validate().is_err());
    }
}
