//! SDK settings.
//!
//! Values are layered from an optional TOML file and then from `FROLLO__`
//! prefixed environment variables (`FROLLO__API__BASE_URL`, ...).

use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::ResultEngine;

pub const DEFAULT_CONFIG_PATH: &str = "config/frollo.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub api: Api,
    pub database: Database,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level used to build the tracing filter.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Api {
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "https://api.frollo.us/api/v2/".to_string(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Self::Memory => String::from("sqlite::memory:"),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

impl Settings {
    /// Load settings from `path` (or [`DEFAULT_CONFIG_PATH`]) and the environment.
    ///
    /// A missing file is not an error.
    pub fn load(path: Option<&str>) -> ResultEngine<Self> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("FROLLO").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
