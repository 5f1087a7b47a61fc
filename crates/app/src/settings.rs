//! Application settings loaded with the `config` crate.
//!
//! Settings come from an optional TOML file (path in `SPENDBOOK_CONFIG`,
//! default `spendbook.toml`) overridden by `SPENDBOOK__`-prefixed environment
//! variables, e.g. `SPENDBOOK__SERVER__PORT=8080`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter applied to every workspace crate.
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var("SPENDBOOK_CONFIG").unwrap_or_else(|_| "spendbook.toml".to_string());

        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("SPENDBOOK").separator("__"))
            .build()?
            .try_deserialize()
    }
}
