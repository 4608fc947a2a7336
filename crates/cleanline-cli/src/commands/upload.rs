//! `cleanline upload <file>` command implementation

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::progress::create_spinner;
use colored::Colorize;
use std::path::Path;

/// Upload a file to a running server and print the job identifiers the
/// caller can poll with `cleanline status`.
pub async fn run(server_url: String, path: String) -> Result<()> {
    let path = Path::new(&path);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::FileNotFound(path.display().to_string()))?
        .to_string();

    let bytes = std::fs::read(path).map_err(|_| CliError::FileNotFound(path.display().to_string()))?;
    let mime_type = guess_mime_type(&file_name);

    let spinner = create_spinner(&format!("Uploading {file_name}..."));
    let client = ApiClient::new(server_url)?;
    let response = client.upload(&file_name, mime_type, bytes).await;
    spinner.finish_and_clear();

    let response = response?;

    println!("{}", "Upload accepted".green().bold());
    println!("  Job ID:  {}", response.job_id);
    println!("  Task ID: {}", response.task_id);
    println!("  Status:  {}", response.status);
    println!();
    println!("Check progress with: cleanline status {}", response.job_id);

    Ok(())
}

fn guess_mime_type(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase().as_str() {
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_type_recognizes_known_extensions() {
        assert_eq!(guess_mime_type("data.csv"), "text/csv");
        assert_eq!(guess_mime_type("DATA.XLSX"), "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet");
        assert_eq!(guess_mime_type("report.pdf"), "application/octet-stream");
    }
}
