//! Cleanline Server - Job Control API entry point

use anyhow::Result;
use cleanline_common::logging::{init_logging, LogConfig};
use cleanline_engine::rule_config::{RuleConfigStore, RuleConfiguration};
use cleanline_engine::strategy::registry::StrategyRegistry;
use cleanline_server::api::{self, AppState};
use cleanline_server::config::Config;
use cleanline_server::progress::ProgressTracker;
use cleanline_server::queue::{QueueTiming, WorkQueue};
use cleanline_server::storage::{config::StorageConfig, Storage};
use cleanline_server::upload_progress::UploadProgressTracker;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("cleanline-server".to_string())
        .filter_directives("cleanline_server=debug,tower_http=debug,axum=trace,sqlx=info".to_string())
        .build();
    let log_config = LogConfig::from_env().unwrap_or(log_config);
    init_logging(&log_config)?;

    info!("starting cleanline server");

    let config = Config::load()?;
    info!(host = %config.server.host, port = config.server.port, "configuration loaded");

    let db = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;
    info!("database connection pool established");

    sqlx::migrate!("../../migrations")
        .run(&db)
        .await
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))?;
    info!("database migrations completed");

    let storage_config = StorageConfig::from_env()?;
    let storage = Arc::new(Storage::new(storage_config).await?);
    info!("storage client initialized");

    let registry = Arc::new(StrategyRegistry::with_builtins());
    let rule_config_store = Arc::new(
        RuleConfigStore::load_from_file(&config.rule_config_store.config_file_path, registry.clone())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to an empty rule configuration");
                RuleConfigStore::new(RuleConfiguration::empty(), registry.clone())
                    .unwrap_or_else(|_| unreachable!("an empty configuration always validates"))
            }),
    );

    // Kept alive for the process lifetime; dropping it stops hot-reload.
    let _watcher = RuleConfigStore::watch_file(rule_config_store.clone(), config.rule_config_store.config_file_path.clone())
        .map_err(|e| anyhow::anyhow!("failed to install rule configuration watcher: {e}"))?;

    let queue = Arc::new(WorkQueue::new(db.clone(), QueueTiming::from(&config.queue)));
    let progress = Arc::new(ProgressTracker::new());
    let upload_progress = Arc::new(UploadProgressTracker::new());
    let config = Arc::new(config);

    let state = AppState {
        db,
        storage,
        queue,
        rule_config_store,
        progress,
        upload_progress: upload_progress.clone(),
        config: config.clone(),
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            ticker.tick().await;
            upload_progress.sweep_expired();
        }
    });

    api::serve((*config).clone(), state).await?;

    info!("server shut down gracefully");
    Ok(())
}
