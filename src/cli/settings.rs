//! Configuration schema for the `config-overlay` binary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display name of the instance
    pub name: String,
    /// Address to listen on
    pub listen: String,
    pub workers: usize,
    /// Tracing filter used when RUST_LOG is unset and --verbose is off
    pub log_level: String,
    pub verbose: bool,
    pub tags: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            listen: "127.0.0.1:8080".to_string(),
            workers: 4,
            log_level: "warn".to_string(),
            verbose: false,
            tags: Vec::new(),
        }
    }
}
