//! `cleanline status <job-id>` command implementation

use crate::api::ApiClient;
use crate::error::Result;
use colored::Colorize;
use uuid::Uuid;

pub async fn run(server_url: String, job_id: Uuid) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let response = client.status(job_id).await?;

    let status_colored = match response.status.as_str() {
        "completed" => response.status.green().bold(),
        "failed" => response.status.red().bold(),
        "processing" => response.status.yellow().bold(),
        _ => response.status.normal().bold(),
    };

    println!("{}", "Job status".cyan().bold());
    println!("  Job ID: {}", response.job_id);
    println!("  Status: {status_colored}");

    if let Some(progress) = response.progress {
        println!("  Progress: {}", serde_json::to_string_pretty(&progress)?);
    }

    if let Some(statistics) = response.statistics {
        println!("  Statistics: {}", serde_json::to_string_pretty(&statistics)?);
    }

    Ok(())
}
