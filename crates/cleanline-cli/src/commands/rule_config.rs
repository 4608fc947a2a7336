//! `cleanline rule-config {show,update,reload}` command implementations

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use cleanline_engine::rule_config::RuleConfiguration;
use colored::Colorize;

pub async fn show(server_url: String) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let response = client.rule_config_current().await?;
    print_response(response)
}

pub async fn update(server_url: String, path: String) -> Result<()> {
    let contents = std::fs::read_to_string(&path).map_err(|_| CliError::FileNotFound(path.clone()))?;
    let config: RuleConfiguration = serde_json::from_str(&contents)?;

    let client = ApiClient::new(server_url)?;
    let response = client.rule_config_update(&config).await?;
    print_response(response)
}

pub async fn reload(server_url: String, path: Option<String>) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let response = client.rule_config_reload(path).await?;
    print_response(response)
}

fn print_response(response: crate::api::RuleConfigResponse) -> Result<()> {
    if !response.success {
        let message = response.error.unwrap_or_else(|| "rule configuration request failed".to_string());
        return Err(CliError::api(message));
    }

    if let Some(message) = &response.message {
        println!("{}", message.green());
    }

    if let Some(config) = response.configuration {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    Ok(())
}
