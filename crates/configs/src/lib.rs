//! # Configuration
//!
//! Typed application settings, layered defaults-then-environment. Variables
//! use the `OGIRIHUB_` prefix with `__` as section separator, e.g.
//! `OGIRIHUB_SERVER__PORT=9090` or `OGIRIHUB_SWEEPER__INTERVAL_SECS=30`.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sweeper: SweeperConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    /// How often the expiry sweeper scans active events, in seconds.
    pub interval_secs: u64,
}

/// The account `cmd/ogirihub` registers at startup so a fresh instance is
/// usable immediately.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: SecretString,
    pub display_name: String,
}

impl AppConfig {
    /// Loads `.env` (if present), then defaults, then `OGIRIHUB_*`
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .set_default("sweeper.interval_secs", 60_i64)?
            .set_default("admin.email", "admin@ogirihub.local")?
            .set_default("admin.password", "change-me")?
            .set_default("admin.display_name", "Admin")?
            .add_source(
                config::Environment::with_prefix("OGIRIHUB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        debug!(host = %cfg.server.host, port = cfg.server.port, "configuration loaded");
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
