// src/connectors/messages.rs
use crate::types::{Account, OrderConfirmation, PriceBar, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account snapshot from GET /v2/account. Alpaca sends monetary fields as
/// decimal strings.
#[derive(Debug, Deserialize)]
pub struct AlpacaAccount {
    pub cash: Decimal,
    pub equity: Decimal,
    pub buying_power: Decimal,
}

impl From<AlpacaAccount> for Account {
    fn from(a: AlpacaAccount) -> Self {
        Account {
            cash: a.cash,
            equity: a.equity,
            buying_power: a.buying_power,
        }
    }
}

/// Open position from GET /v2/positions. Crypto symbols come back without
/// the slash ("BTCUSD").
#[derive(Debug, Deserialize)]
pub struct AlpacaPosition {
    pub symbol: String,
    pub qty: Decimal,
}

/// Order as returned by POST /v2/orders and GET /v2/orders.
#[derive(Debug, Deserialize)]
pub struct AlpacaOrder {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: Side,
    /// Absent for notional orders.
    pub qty: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<AlpacaOrder> for OrderConfirmation {
    fn from(o: AlpacaOrder) -> Self {
        OrderConfirmation {
            id: o.id,
            symbol: o.symbol,
            order_type: o.order_type,
            side: o.side,
            qty: o.qty.unwrap_or_default(),
            status: o.status,
            created_at: o.created_at,
        }
    }
}

/// Order submission body for POST /v2/orders.
#[derive(Debug, Serialize)]
pub struct AlpacaOrderRequest {
    pub symbol: String,
    pub qty: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub time_in_force: String,
    pub client_order_id: String,
}

/// Single bar from the crypto bars endpoint. Short field names match the
/// Alpaca wire format.
#[derive(Debug, Deserialize)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "o")]
    pub open: f64,

    #[serde(rename = "h")]
    pub high: f64,

    #[serde(rename = "l")]
    pub low: f64,

    #[serde(rename = "c")]
    pub close: f64,

    #[serde(rename = "v")]
    pub volume: f64,
}

impl From<&AlpacaBar> for PriceBar {
    fn from(b: &AlpacaBar) -> Self {
        PriceBar {
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
            timestamp: b.timestamp,
        }
    }
}

/// GET /v1beta3/crypto/us/bars response: bars keyed by symbol.
#[derive(Debug, Deserialize)]
pub struct AlpacaBarsResponse {
    pub bars: HashMap<String, Vec<AlpacaBar>>,
    pub next_page_token: Option<String>,
}

/// Error body Alpaca attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct AlpacaErrorBody {
    pub code: Option<i64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_parses_decimal_strings() {
        let json = r#"{"cash":"1000.50","equity":"1200.75","buying_power":"2401.50"}"#;
        let account: AlpacaAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.cash.to_string(), "1000.50");
        assert_eq!(account.equity.to_string(), "1200.75");
    }

    #[test]
    fn bars_response_parses_short_field_names() {
        let json = r#"{
            "bars": {
                "BTC/USD": [
                    {"t":"2023-02-01T10:00:00Z","o":100.0,"h":105.0,"l":99.0,"c":95.5,"v":12.5}
                ]
            },
            "next_page_token": null
        }"#;
        let resp: AlpacaBarsResponse = serde_json::from_str(json).unwrap();
        let bar = &resp.bars["BTC/USD"][0];
        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.close, 95.5);

        let price_bar = PriceBar::from(bar);
        assert_eq!(price_bar.volume, 12.5);
    }

    #[test]
    fn order_without_qty_maps_to_zero() {
        let json = r#"{
            "id":"abc","symbol":"BTCUSD","type":"market","side":"buy",
            "qty":null,"status":"filled","created_at":"2023-02-01T10:00:00Z"
        }"#;
        let order: AlpacaOrder = serde_json::from_str(json).unwrap();
        let conf = OrderConfirmation::from(order);
        assert!(conf.qty.is_zero());
        assert_eq!(conf.side, Side::Buy);
    }

    #[test]
    fn error_body_parses_message() {
        let json = r#"{"code":40310000,"message":"insufficient balance for BTC"}"#;
        let body: AlpacaErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.message, "insufficient balance for BTC");
    }
}
