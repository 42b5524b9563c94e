//! Engine configuration
//!
//! Layered configuration in the usual order: `lexis.toml` (optional), then
//! `LEXIS_*` environment variables. A local `.env` file is honored for
//! development.

use config::{Config as Loader, Environment, File};
use serde::Deserialize;

/// Row-count threshold below which a saved code set stores its full row list.
pub const DEFAULT_MATERIALIZATION_THRESHOLD: usize = 500;

/// Maximum number of rows returned by a concept search.
pub const DEFAULT_SEARCH_CAP: usize = 1000;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_min_size: 0,
            pool_max_size: 10,
            connect_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub materialization_threshold: usize,
    pub search_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            materialization_threshold: DEFAULT_MATERIALIZATION_THRESHOLD,
            search_cap: DEFAULT_SEARCH_CAP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from `lexis.toml` and `LEXIS_*` environment
    /// variables (e.g. `LEXIS_DATABASE__URL`).
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Loader::builder()
            .add_source(File::with_name("lexis").required(false))
            .add_source(Environment::with_prefix("LEXIS").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
