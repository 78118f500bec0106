use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Fallback signing secret from the original local-dev setup. Anything
/// deployed for real must override it via APP_AUTH__JWT_SECRET.
pub const DEV_JWT_SECRET: &str = "opto-local-dev-secret-2026";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_lifetime_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default values
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.url", "sqlite://data/opto.db")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_lifetime_days", 7)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.max_bytes", 5 * 1024 * 1024)?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in settings from environment variables (with prefix "APP_")
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }

    /// Fixed settings for tests: in-memory database, known secret. Public
    /// so the integration tests under tests/ can build real app state.
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("environment", "test")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("server.workers", 1)?
            // A single pooled connection so every handle sees the same
            // in-memory database
            .set_default("database.url", "sqlite::memory:")?
            .set_default("database.max_connections", 1)?
            .set_default("auth.jwt_secret", "test_secret")?
            .set_default("auth.token_lifetime_days", 7)?
            .set_default("uploads.dir", "target/test-uploads")?
            .set_default("uploads.max_bytes", 5 * 1024 * 1024)?
            .build()?
            .try_deserialize()
    }
}
