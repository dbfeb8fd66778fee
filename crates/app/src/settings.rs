//! Handles settings for the application. Configuration is written in
//! `config/tandem.toml`, with `TANDEM__`-prefixed environment variables
//! taking precedence.

use config::{Config, ConfigError, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/tandem";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: 3000,
            database: Database::Sqlite("./tandem.db".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Ocr {
    pub api_key: String,
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ocr_timeout_secs() -> u64 {
    20
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub ocr: Option<Ocr>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false))
            .add_source(config::Environment::with_prefix("TANDEM").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
