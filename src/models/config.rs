use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime settings of the blog server.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Path of the SQLite database file.
    pub database_url: String,
    pub address: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load settings from `config/default.yaml` (optional) and `APP_*`
    /// environment variables, the latter taking precedence.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "app.db")?
            .set_default("address", "127.0.0.1")?
            .set_default("port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}
