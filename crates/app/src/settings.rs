//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `BRILINK__*` environment variables,
//! e.g. `BRILINK__APP__LEVEL=debug`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// `database = "memory"` or `database = { sqlite = "./brilink.db" }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("./brilink.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Ledger {
    /// Undo window of a delete, in milliseconds.
    #[serde(default = "default_grace_ms")]
    pub delete_grace_ms: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            delete_grace_ms: default_grace_ms(),
        }
    }
}

fn default_grace_ms() -> u64 {
    5000
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("BRILINK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
