//! Cleanline Server Library
#![recursion_limit = "256"]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_div_ceil)]
#![allow(clippy::redundant_closure)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::useless_format)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::new_without_default)]
#![allow(clippy::impl_trait_in_params)]
#![allow(clippy::unnecessary_lazy_evaluations)]
#![allow(clippy::redundant_field_names)]
#![allow(clippy::needless_borrow)]
#![allow(clippy::manual_clamp)]
#![allow(clippy::map_clone)]
#![allow(clippy::option_map_or_none)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::get_first)]
#![allow(clippy::host_endian_bytes)]
#![allow(clippy::io_other_error)]
#![allow(clippy::type_complexity)]
//!
//! HTTP server and worker process for the data cleaning core: ingests
//! spreadsheets, validates rows against a hot-reloadable rule engine, and
//! serves progress/results over a JSON API.
//!
//! # Architecture
//!
//! - **Job Control API** (`api`): upload, status, progress, metrics,
//!   paginated data/downloads, rule-config CRUD, upload-progress SSE.
//! - **Task Producer** (`jobs`): validates uploads, persists `FileRecord`s,
//!   enqueues tasks.
//! - **Work Queue** (`queue`): Postgres-backed at-least-once task queue with
//!   visibility timeouts and exponential-backoff retry.
//! - **Task Consumer** (`worker`): the separate worker binary's
//!   parse → process → persist → report loop.
//! - **Progress Tracker** (`progress`) / **Upload Progress Tracker**
//!   (`upload_progress`): in-memory telemetry surfaced to API clients.
//! - **Rule Configuration API** (`rule_config_api`): thin HTTP wrapper over
//!   `cleanline_engine::rule_config::RuleConfigStore`.
//!
//! # Framework Stack
//!
//! - **Axum**: HTTP routing and extractors.
//! - **SQLx**: Postgres access, runtime-checked queries.
//! - **Tower** / **tower-http**: middleware (CORS, tracing).
//!
//! # Example
//!
//! ```no_run
//! use cleanline_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod progress;
pub mod queue;
pub mod rule_config_api;
pub mod storage;
pub mod upload_progress;
pub mod worker;

pub use error::{AppError, ServerResult};
