// src/config.rs

use config::{Config, ConfigError, Environment};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Reversal,
    Model,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api_key_id: String,
    pub api_secret_key: String,
    /// Trading API base. The paper endpoint is the default on purpose.
    pub api_base_url: String,
    pub data_base_url: String,
    pub symbol: String,
    pub trade_qty: Decimal,
    pub poll_interval_secs: u64,
    /// When set, cycles align to this wall-clock minute of every hour
    /// instead of running on a plain interval.
    pub minute_offset: Option<u32>,
    pub strategy: StrategyKind,
    pub model_path: String,
    pub status_file: String,
    pub history_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("api_key_id", "")?
            .set_default("api_secret_key", "")?
            .set_default("api_base_url", "https://paper-api.alpaca.markets")?
            .set_default("data_base_url", "https://data.alpaca.markets")?
            .set_default("symbol", "BTC/USD")?
            .set_default("trade_qty", "0.01")?
            .set_default("poll_interval_secs", 3600_i64)?
            .set_default("strategy", "reversal")?
            .set_default("model_path", "model.json")?
            .set_default("status_file", "bot_status.json")?
            .set_default("history_limit", 10_i64)?
            // APCA_API_KEY_ID, APCA_API_SECRET_KEY, APCA_API_BASE_URL
            .add_source(Environment::with_prefix("APCA"))
            // BOT_SYMBOL, BOT_TRADE_QTY, BOT_POLL_INTERVAL_SECS, ...
            .add_source(Environment::with_prefix("BOT"));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn is_paper(&self) -> bool {
        self.api_base_url.contains("paper")
    }
}
