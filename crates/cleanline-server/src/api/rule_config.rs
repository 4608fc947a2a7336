//! `rule-config/{current,update,reload,history,stats}` routes: thin HTTP
//! wiring over [`crate::rule_config_api`].

use crate::api::AppState;
use crate::rule_config_api::{self, HistoryResponse, RuleConfigResponse};
use axum::extract::{Query, State};
use axum::Json;
use cleanline_engine::rule_config::RuleConfiguration;
use serde::Deserialize;

pub async fn current(State(state): State<AppState>) -> Json<RuleConfigResponse> {
    Json(rule_config_api::current(&state.rule_config_store))
}

pub async fn update(State(state): State<AppState>, Json(new_config): Json<RuleConfiguration>) -> Json<RuleConfigResponse> {
    Json(rule_config_api::update(&state.rule_config_store, new_config))
}

#[derive(Debug, Deserialize)]
pub struct ReloadRequest {
    pub path: Option<String>,
}

pub async fn reload(State(state): State<AppState>, Json(body): Json<ReloadRequest>) -> Json<RuleConfigResponse> {
    let path = body.path.unwrap_or_else(|| state.config.rule_config_store.config_file_path.clone());
    Json(rule_config_api::reload(&state.rule_config_store, &path))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn history(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> Json<HistoryResponse> {
    Json(rule_config_api::history(&state.rule_config_store, query.limit))
}

pub async fn stats(State(state): State<AppState>) -> Json<rule_config_api::ConfigStatsResponse> {
    Json(rule_config_api::stats(&state.rule_config_store))
}
