use crate::types::{Account, OrderConfirmation, OrderError, Position, PriceBar, Side};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[async_trait]
pub trait TradingClient: Send + Sync {
    async fn get_account(&self) -> Result<Account>;

    async fn get_positions(&self) -> Result<Vec<Position>>;

    /// Submits a GTC market order. Rejections come back as
    /// `OrderError::Rejected` so the caller can decide to log and move on.
    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        qty: Decimal,
    ) -> Result<OrderConfirmation, OrderError>;

    /// Most recent orders first, at most `limit` of them.
    async fn list_orders(&self, limit: usize) -> Result<Vec<OrderConfirmation>>;
}

#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// One-hour bars for `symbol` over `[start, end)`, ascending by timestamp.
    async fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>>;
}
