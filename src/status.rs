// src/status.rs
use crate::types::{Account, OrderConfirmation, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;

/// Snapshot the dashboard reads. Overwritten whole every cycle, no history
/// merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub equity: String,
    pub buying_power: String,
    pub order_history: Vec<OrderRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: Side,
    pub qty: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderConfirmation> for OrderRecord {
    fn from(o: &OrderConfirmation) -> Self {
        OrderRecord {
            symbol: o.symbol.clone(),
            order_type: o.order_type.clone(),
            side: o.side,
            qty: o.qty,
            created_at: o.created_at,
        }
    }
}

/// Best-effort writer for the status file. Write failures are logged and
/// swallowed; a broken dashboard must not affect trading.
pub struct StatusSink {
    path: PathBuf,
    history_limit: usize,
}

impl StatusSink {
    pub fn new(path: impl Into<PathBuf>, history_limit: usize) -> Self {
        Self {
            path: path.into(),
            history_limit,
        }
    }

    pub async fn write(&self, account: &Account, orders: &[OrderConfirmation]) {
        let status = Status {
            equity: account.equity.to_string(),
            buying_power: account.buying_power.to_string(),
            order_history: orders
                .iter()
                .take(self.history_limit)
                .map(Into::into)
                .collect(),
        };

        match serde_json::to_string_pretty(&status) {
            Ok(data) => {
                if let Err(e) = tokio::fs::write(&self.path, data).await {
                    error!("Failed to write status file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => error!("Failed to serialize status: {}", e),
        }
    }

    /// Missing or unparsable file yields an empty default status.
    pub async fn load(&self) -> Status {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Status::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_status_path() -> PathBuf {
        std::env::temp_dir().join(format!("bot_status_{}.json", Uuid::new_v4()))
    }

    fn account(equity: i64) -> Account {
        Account {
            cash: Decimal::new(500, 0),
            equity: Decimal::new(equity, 0),
            buying_power: Decimal::new(equity * 2, 0),
        }
    }

    fn order(i: usize) -> OrderConfirmation {
        OrderConfirmation {
            id: i.to_string(),
            symbol: "BTC/USD".to_string(),
            order_type: "market".to_string(),
            side: Side::Buy,
            qty: Decimal::new(1, 2),
            status: "filled".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_default() {
        let sink = StatusSink::new(temp_status_path(), 10);
        assert_eq!(sink.load().await, Status::default());
    }

    #[tokio::test]
    async fn write_then_load_round_trips_equity() {
        let sink = StatusSink::new(temp_status_path(), 10);
        sink.write(&account(1234), &[order(0)]).await;

        let status = sink.load().await;
        assert_eq!(status.equity, "1234");
        assert_eq!(status.buying_power, "2468");
        assert_eq!(status.order_history.len(), 1);
    }

    #[tokio::test]
    async fn history_is_truncated_to_limit() {
        let sink = StatusSink::new(temp_status_path(), 10);
        let orders: Vec<OrderConfirmation> = (0..15).map(order).collect();
        sink.write(&account(1000), &orders).await;

        let status = sink.load().await;
        assert_eq!(status.order_history.len(), 10);
        // newest-first ordering from the client is preserved
        assert_eq!(status.order_history[0].symbol, "BTC/USD");
    }

    #[tokio::test]
    async fn write_overwrites_previous_snapshot() {
        let sink = StatusSink::new(temp_status_path(), 10);
        sink.write(&account(1000), &(0..5).map(order).collect::<Vec<_>>())
            .await;
        sink.write(&account(2000), &[]).await;

        let status = sink.load().await;
        assert_eq!(status.equity, "2000");
        assert!(status.order_history.is_empty());
    }
}
