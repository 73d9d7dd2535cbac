// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::logger::LogFormat;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(rename = "static")]
    pub static_files: StaticConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
    /// Serve each connection on its own task instead of one at a time
    pub concurrent: bool,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    /// Directory unmatched paths are resolved against
    pub root: String,
    /// Serve the root index file for any unmatched path instead of 404
    pub spa_fallback: bool,
    pub index_file: String,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Upper bound on body bytes read, whatever `Content-Length` claims
    pub max_body_size: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}
