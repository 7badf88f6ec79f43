//! Configuration management for LottoMind
//!
//! Loads defaults, optional `config/default` and `config/local` files, then
//! environment variables (`LOTTOMIND__SECTION__KEY`) with `.env` support.

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub storage: StorageConfig,
    pub strategy: StrategyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Results search endpoint
    pub base_url: String,
    /// Game identifier (LAPR = La Primitiva)
    pub game_id: String,
    /// First year a full backfill asks for
    pub first_year: i32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Referer sent with every request
    pub referer: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.loteriasyapuestas.es/servicios/buscadorSorteos".to_string(),
            game_id: "LAPR".to_string(),
            first_year: 1985,
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            referer: "https://www.loteriasyapuestas.es/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Data directory
    pub data_dir: String,
    /// History file name inside `data_dir`
    pub history_file: String,
}

impl StorageConfig {
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.history_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            history_file: "historico.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,
    /// Emit JSON lines instead of human readable output
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

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let feed = FeedConfig::default();
        let config = Config::builder()
            // Feed defaults
            .set_default("feed.base_url", feed.base_url)?
            .set_default("feed.game_id", feed.game_id)?
            .set_default("feed.first_year", feed.first_year)?
            .set_default("feed.timeout_secs", 15)?
            .set_default("feed.user_agent", feed.user_agent)?
            .set_default("feed.referer", feed.referer)?
            // Storage defaults
            .set_default("storage.data_dir", "./data")?
            .set_default("storage.history_file", "historico.csv")?
            // Strategy defaults
            .set_default("strategy.max_sampler_attempts", 10_000)?
            .set_default("strategy.sequence.lookback", 10)?
            .set_default("strategy.sequence.train_window", 200)?
            .set_default("strategy.sequence.epochs", 10)?
            .set_default("strategy.sequence.batch_size", 16)?
            .set_default("strategy.sequence.hidden_units", 64)?
            .set_default("strategy.sequence.learning_rate", 0.001)?
            .set_default("strategy.sequence.reintegro_window", 50)?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (LOTTOMIND__*)
            .add_source(Environment::with_prefix("LOTTOMIND").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// One line summary for the startup log
    pub fn digest(&self) -> String {
        format!(
            "history={} first_year={} lookback={} epochs={} seed={:?}",
            self.storage.history_path().display(),
            self.feed.first_year,
            self.strategy.sequence.lookback,
            self.strategy.sequence.epochs,
            self.strategy.seed
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            storage: StorageConfig::default(),
            strategy: StrategyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
