//! Cleanline Worker - Task Consumer supervisor process.
//!
//! Runs the Task Consumer loop alongside a periodic expired-lease reclaim
//! sweep, and shuts down gracefully on Ctrl+C / SIGTERM.

use anyhow::Result;
use cleanline_common::logging::{init_logging, LogConfig};
use cleanline_engine::rule_config::{RuleConfigStore, RuleConfiguration};
use cleanline_engine::strategy::registry::StrategyRegistry;
use cleanline_server::config::Config;
use cleanline_server::progress::ProgressTracker;
use cleanline_server::queue::{QueueTiming, WorkQueue};
use cleanline_server::storage::{config::StorageConfig, Storage};
use cleanline_server::worker::TaskConsumer;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("cleanline-worker".to_string())
        .filter_directives("cleanline_server=debug,sqlx=info".to_string())
        .build();
    let log_config = LogConfig::from_env().unwrap_or(log_config);
    init_logging(&log_config)?;

    info!("starting cleanline worker");

    let config = Arc::new(Config::load()?);

    let db = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;
    info!("database connection pool established");

    let storage_config = StorageConfig::from_env()?;
    let storage = Arc::new(Storage::new(storage_config).await?);

    let strategy_registry = Arc::new(StrategyRegistry::with_builtins());
    let rule_config_store = Arc::new(
        RuleConfigStore::load_from_file(&config.rule_config_store.config_file_path, strategy_registry.clone())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to an empty rule configuration");
                RuleConfigStore::new(RuleConfiguration::empty(), strategy_registry.clone())
                    .unwrap_or_else(|_| unreachable!("an empty configuration always validates"))
            }),
    );
    let _watcher = RuleConfigStore::watch_file(rule_config_store.clone(), config.rule_config_store.config_file_path.clone())
        .map_err(|e| anyhow::anyhow!("failed to install rule configuration watcher: {e}"))?;

    let queue = Arc::new(WorkQueue::new(db.clone(), QueueTiming::from(&config.queue)));
    let progress = Arc::new(ProgressTracker::new());

    let worker_id = format!("worker-{}", Uuid::new_v4());
    let consumer = TaskConsumer::new(
        db,
        storage,
        queue.clone(),
        rule_config_store,
        strategy_registry,
        progress.clone(),
        worker_id.clone(),
        config.clone(),
    );

    info!(worker_id = %worker_id, "task consumer starting");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let consumer_handle = tokio::spawn({
        let shutdown_rx = shutdown_rx.clone();
        async move { consumer.run(shutdown_rx).await }
    });

    let sweeper_handle = tokio::spawn(run_sweeps(queue, shutdown_rx));

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, stopping task consumer");
    let _ = shutdown_tx.send(true);

    let _ = consumer_handle.await;
    let _ = sweeper_handle.await;

    info!("worker shut down gracefully");
    Ok(())
}

/// Reclaims expired task leases on a fixed interval until `shutdown` resolves.
async fn run_sweeps(queue: Arc<WorkQueue>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
            _ = ticker.tick() => {
                match queue.reclaim_expired().await {
                    Ok(n) if n > 0 => info!(reclaimed = n, "reclaimed expired task leases"),
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "failed to reclaim expired task leases"),
                }
            }
        }
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
