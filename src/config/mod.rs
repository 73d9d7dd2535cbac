// Configuration module entry point
// Loads layered configuration and holds the frozen serving state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig, StaticConfig};

/// Environment variable prefix, e.g. `MICROWEB_SERVER__PORT=9000`
const ENV_PREFIX: &str = "MICROWEB";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.concurrent", false)?
            .set_default("static.root", "static")?
            .set_default("static.spa_fallback", false)?
            .set_default("static.index_file", "index.html")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("logging.level", "info")?
            .set_default("logging.format", "logfmt")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Body cap as a `usize`, saturating on narrow targets
    pub fn max_body_size(&self) -> usize {
        usize::try_from(self.http.max_body_size).unwrap_or(usize::MAX)
    }
}
