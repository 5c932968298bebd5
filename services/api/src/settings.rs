//! Layered service settings
//!
//! Built-in defaults, then an optional `journal.toml`, then `JOURNAL_*`
//! environment variables (`JOURNAL_SERVER__PORT=8080`), then the plain
//! `DATABASE_URL`, `JWT_SECRET` and `API_PORT` variables.

use auth::jwt::JwtConfig;
use common::database::DatabaseConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Serve the unscoped `GET /api/<collection>` listings
    pub expose_global_lists: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            expose_global_lists: true,
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl Settings {
    /// Load settings, reading `journal.toml` from the working directory if present
    pub fn new() -> Result<Self, ConfigError> {
        Self::load("journal")
    }

    /// Load settings from an optional file (extension may be omitted)
    pub fn load(file: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.expose_global_lists", true)?
            .add_source(
                File::with_name(file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("JOURNAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("server.port", env::var("API_PORT").ok())?
            .build()?;

        config.try_deserialize()
    }
}
