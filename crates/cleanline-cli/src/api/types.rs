//! Response shapes mirroring the server's `api::response`/`rule_config_api`
//! envelopes, just enough to deserialize what the CLI displays.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub job_id: Uuid,
    pub task_id: Uuid,
    pub file_id: Uuid,
    pub message: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub job_id: Uuid,
    pub status: String,
    pub progress: Option<Value>,
    pub statistics: Option<Value>,
}

/// Mirrors `rule_config_api::RuleConfigResponse`.
#[derive(Debug, Deserialize)]
pub struct RuleConfigResponse {
    pub success: bool,
    pub configuration: Option<cleanline_engine::rule_config::RuleConfiguration>,
    pub message: Option<String>,
    pub error: Option<String>,
}
