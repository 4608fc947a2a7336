//! HTTP API client for a running Cleanline server.

use crate::api::types::*;
use crate::error::Result;
use cleanline_engine::rule_config::RuleConfiguration;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

/// Default timeout for API requests in seconds. Generous to accommodate
/// large file uploads. Override via `CLEANLINE_API_TIMEOUT_SECS`.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// API client for the Cleanline server.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let timeout_secs = std::env::var("CLEANLINE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CLEANLINE_SERVER_URL")
            .unwrap_or_else(|_| crate::config::DEFAULT_SERVER_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Uploads a file for cleaning, returning the job/task identifiers the
    /// caller polls with.
    pub async fn upload(&self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        let url = format!("{}/api/data-cleaning/upload", self.base_url);

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()).mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?.error_for_status()?;

        Ok(response.json().await?)
    }

    /// Fetches the job status by id, including any in-flight progress.
    pub async fn status(&self, job_id: Uuid) -> Result<StatusResponse> {
        let url = format!("{}/api/data-cleaning/status/{job_id}", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Fetches the active rule configuration.
    pub async fn rule_config_current(&self) -> Result<RuleConfigResponse> {
        let url = format!("{}/api/rule-config/current", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Replaces the active rule configuration.
    pub async fn rule_config_update(&self, config: &RuleConfiguration) -> Result<RuleConfigResponse> {
        let url = format!("{}/api/rule-config/update", self.base_url);
        let response = self.client.put(&url).json(config).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Asks the server to reload its rule configuration, optionally from a
    /// path on the server's own filesystem.
    pub async fn rule_config_reload(&self, path: Option<String>) -> Result<RuleConfigResponse> {
        let url = format!("{}/api/rule-config/reload", self.base_url);
        let response = self.client.post(&url).json(&serde_json::json!({ "path": path })).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:8000".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let client = ApiClient::new("http://localhost:1".to_string()).unwrap();
        let result = client.health_check().await.unwrap();
        assert!(!result);
    }
}
