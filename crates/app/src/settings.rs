//! Application settings.
//!
//! Read from `config/famledger.toml` (or the `--config` path) when present,
//! then from `FAMLEDGER__*` environment variables, then from command-line
//! flags.

use serde::Deserialize;

use crate::{
    cli::{Cli, OutputFormat},
    error::Result,
};

const DEFAULT_CONFIG_PATH: &str = "config/famledger.toml";

#[derive(Debug, Clone, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("famledger.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Report {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub report: Report,
    /// Raw connection string from `--database-url`; wins over `database`.
    #[serde(skip)]
    pub database_url: Option<String>,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FAMLEDGER").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(level) = &cli.level {
            settings.app.level = level.clone();
        }
        if let Some(format) = cli.format {
            settings.report.format = format;
        }
        settings.database_url = cli.database_url.clone();
        Ok(settings)
    }

    pub fn connection_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| self.database.url())
    }
}
