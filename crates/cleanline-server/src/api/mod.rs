pub mod data;
pub mod download;
pub mod files;
pub mod health;
pub mod response;
pub mod rule_config;
pub mod status;
pub mod upload;
pub mod upload_progress_api;

use crate::config::Config;
use crate::progress::ProgressTracker;
use crate::queue::WorkQueue;
use crate::storage::Storage;
use crate::upload_progress::UploadProgressTracker;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use cleanline_engine::rule_config::RuleConfigStore;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<Storage>,
    pub queue: Arc<WorkQueue>,
    pub rule_config_store: Arc<RuleConfigStore>,
    pub progress: Arc<ProgressTracker>,
    pub upload_progress: Arc<UploadProgressTracker>,
    pub config: Arc<Config>,
}

/// Builds the full Job Control API router (see `SPEC_FULL.md` §6).
pub fn router(state: AppState) -> Router {
    let data_cleaning = Router::new()
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(state.config.upload.max_file_size_bytes as usize))
        .route("/status/:jobId", get(status::status))
        .route("/check-status/:taskId", get(status::check_status))
        .route("/progress/:jobId", get(status::progress))
        .route("/metrics/:jobId", get(status::metrics))
        .route("/report/:jobId", get(status::report))
        .route("/files", get(files::list))
        .route("/files/:fileId", get(files::detail))
        .route("/data/clean/:jobId", get(data::clean))
        .route("/data/exceptions/:jobId", get(data::exceptions))
        .route("/download/clean/:jobId", get(download::clean))
        .route("/download/exceptions/:jobId", get(download::exceptions));

    let rule_config = Router::new()
        .route("/current", get(rule_config::current))
        .route("/update", put(rule_config::update))
        .route("/reload", post(rule_config::reload))
        .route("/history", get(rule_config::history))
        .route("/stats", get(rule_config::stats));

    let upload_progress = Router::new()
        .route("/active/all", get(upload_progress_api::active))
        .route("/stream/:uploadId", get(upload_progress_api::stream))
        .route("/:uploadId", get(upload_progress_api::one));

    Router::new()
        .nest("/api/data-cleaning", data_cleaning)
        .nest("/api/rule-config", rule_config)
        .nest("/api/upload-progress", upload_progress)
        .route("/health", get(health::health))
        .layer(crate::middleware::cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves the Job Control API until the process is signaled to stop.
pub async fn serve(config: Config, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(%addr, "listening");

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    Ok(())
}

async fn shutdown_signal(timeout_secs: u64) {
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
        _ = ctrl_c => tracing::info!("received Ctrl+C, starting graceful shutdown"),
        _ = terminate => tracing::info!("received terminate signal, starting graceful shutdown"),
    }

    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
