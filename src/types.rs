// src/types.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// Trading advice derived from bar data. `Hold` means no action this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Advice(Side),
    Hold,
}

/// Account snapshot, fetched fresh every cycle. Never cached.
#[derive(Debug, Clone)]
pub struct Account {
    pub cash: Decimal,
    pub equity: Decimal,
    pub buying_power: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
}

/// OHLCV summary of one hour of price action.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: String,
    pub symbol: String,
    pub order_type: String,
    pub side: Side,
    pub qty: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Failure modes of order submission. Rejections (insufficient funds,
/// insufficient position) are expected during normal operation and must not
/// take the scheduler down.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order rejected by brokerage: {0}")]
    Rejected(String),
    #[error("order transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}
