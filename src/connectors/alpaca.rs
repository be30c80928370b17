// src/connectors/alpaca.rs
use crate::config::AppConfig;
use crate::connectors::messages::{
    AlpacaAccount, AlpacaBarsResponse, AlpacaErrorBody, AlpacaOrder, AlpacaOrderRequest,
    AlpacaPosition,
};
use crate::connectors::traits::{MarketDataClient, TradingClient};
use crate::types::{Account, OrderConfirmation, OrderError, Position, PriceBar, Side};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

/// REST client for the Alpaca trading and market data APIs.
///
/// Auth is plain header auth (key id + secret); the crypto bars endpoint
/// works without credentials but gets them anyway when configured.
pub struct AlpacaClient {
    api_key_id: String,
    api_secret_key: String,
    trading_url: String,
    data_url: String,
    http_client: Client,
}

impl AlpacaClient {
    pub fn new(
        api_key_id: String,
        api_secret_key: String,
        trading_url: String,
        data_url: String,
    ) -> Self {
        Self {
            api_key_id,
            api_secret_key,
            trading_url: trading_url.trim_end_matches('/').to_string(),
            data_url: data_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.api_key_id.clone(),
            config.api_secret_key.clone(),
            config.api_base_url.clone(),
            config.data_base_url.clone(),
        )
    }

    fn auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("APCA-API-KEY-ID", &self.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.api_secret_key)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .auth(self.http_client.get(url).query(query))
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {}", url))
    }
}

#[async_trait]
impl TradingClient for AlpacaClient {
    async fn get_account(&self) -> Result<Account> {
        let url = format!("{}/v2/account", self.trading_url);
        let account: AlpacaAccount = self.get_json(&url, &[]).await?;
        Ok(account.into())
    }

    async fn get_positions(&self) -> Result<Vec<Position>> {
        let url = format!("{}/v2/positions", self.trading_url);
        let positions: Vec<AlpacaPosition> = self.get_json(&url, &[]).await?;
        Ok(positions
            .into_iter()
            .map(|p| Position {
                symbol: p.symbol,
                quantity: p.qty,
            })
            .collect())
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        qty: Decimal,
    ) -> Result<OrderConfirmation, OrderError> {
        let request = AlpacaOrderRequest {
            symbol: symbol.to_string(),
            qty: qty.to_string(),
            side: side.as_str().to_string(),
            order_type: "market".to_string(),
            time_in_force: "gtc".to_string(),
            client_order_id: Uuid::new_v4().to_string(),
        };

        info!("🚀 Submitting order: {} {} {}", side.as_str(), qty, symbol);

        let url = format!("{}/v2/orders", self.trading_url);
        let response = self
            .auth(self.http_client.post(&url).json(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let message = match response.json::<AlpacaErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => "rejection without a readable error body".to_string(),
            };
            return Err(OrderError::Rejected(message));
        }

        let order = response.json::<AlpacaOrder>().await?;
        Ok(order.into())
    }

    async fn list_orders(&self, limit: usize) -> Result<Vec<OrderConfirmation>> {
        let url = format!("{}/v2/orders", self.trading_url);
        let query = [
            ("status", "all".to_string()),
            ("direction", "desc".to_string()),
            ("limit", limit.to_string()),
        ];
        let orders: Vec<AlpacaOrder> = self.get_json(&url, &query).await?;
        Ok(orders.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl MarketDataClient for AlpacaClient {
    async fn get_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let url = format!("{}/v1beta3/crypto/us/bars", self.data_url);
        let query = [
            ("symbols", symbol.to_string()),
            ("timeframe", "1Hour".to_string()),
            ("start", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            // One page is enough: strategy lookbacks are capped at 1000 bars.
            ("limit", "1000".to_string()),
        ];

        let response: AlpacaBarsResponse = self.get_json(&url, &query).await?;

        let mut bars: Vec<PriceBar> = response
            .bars
            .get(symbol)
            .map(|bars| bars.iter().map(Into::into).collect())
            .unwrap_or_default();
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}
