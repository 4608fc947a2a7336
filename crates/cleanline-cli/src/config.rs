//! Configuration management for the Cleanline CLI
//!
//! Handles CLI settings like the target server URL.

use serde::{Deserialize, Serialize};

/// Default Cleanline server URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cleanline server URL
    pub server_url: String,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            verbose: false,
        }
    }

    /// Load config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(url) = std::env::var("CLEANLINE_SERVER_URL") {
            config.server_url = url;
        }

        config
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn set_server_url(&mut self, url: String) {
        self.server_url = url;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("CLEANLINE_SERVER_URL", "http://example.com");
        let config = Config::from_env();
        assert_eq!(config.server_url, "http://example.com");
        std::env::remove_var("CLEANLINE_SERVER_URL");
    }
}
