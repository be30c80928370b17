// src/core/engine.rs
use crate::config::AppConfig;
use crate::connectors::traits::{MarketDataClient, TradingClient};
use crate::status::StatusSink;
use crate::strategies::traits::Strategy;
use crate::types::{Side, Signal};
use anyhow::{Context, Result};
use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Drives the polling loop: one `run_cycle` per tick, sequential, no
/// overlapping invocations. The engine holds no trading state between
/// cycles; everything is re-read from the brokerage.
pub struct TradingEngine {
    config: AppConfig,
    trading: Arc<dyn TradingClient>,
    market_data: Arc<dyn MarketDataClient>,
    strategy: Box<dyn Strategy>,
    status: StatusSink,
}

impl TradingEngine {
    pub fn new(
        config: AppConfig,
        trading: Arc<dyn TradingClient>,
        market_data: Arc<dyn MarketDataClient>,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        let status = StatusSink::new(config.status_file.clone(), config.history_limit);
        Self {
            config,
            trading,
            market_data,
            strategy,
            status,
        }
    }

    /// Runs until the process is killed. A failed cycle is logged and the
    /// next tick retries naturally; there is no backoff.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Engine running. Strategy: {}, symbol: {}, qty: {}",
            self.strategy.name(),
            self.config.symbol,
            self.config.trade_qty
        );

        loop {
            let delay = delay_until_next_tick(
                self.config.poll_interval_secs,
                self.config.minute_offset,
                Utc::now(),
            );
            sleep(delay).await;

            if let Err(e) = self.run_cycle().await {
                error!("Cycle aborted: {:#}", e);
            }
        }
    }

    /// One scheduled cycle: account snapshot, status write, reference bars,
    /// signal, at most one market order. Fetch failures propagate and abort
    /// the cycle; order rejections are logged and swallowed.
    pub async fn run_cycle(&self) -> Result<()> {
        let account = self
            .trading
            .get_account()
            .await
            .context("account fetch failed")?;
        info!(
            "Account: cash={} equity={}",
            account.cash, account.equity
        );

        let orders = self
            .trading
            .list_orders(self.config.history_limit)
            .await
            .context("order listing failed")?;
        self.status.write(&account, &orders).await;

        let end = Utc::now();
        let start = bar_window_start(end, self.strategy.lookback());
        let bars = self
            .market_data
            .get_bars(&self.config.symbol, start, end)
            .await
            .context("bar fetch failed")?;
        if bars.is_empty() {
            anyhow::bail!("no bars returned for {}", self.config.symbol);
        }

        match self.strategy.evaluate(&bars)? {
            Signal::Advice(Side::Buy) => self.submit(Side::Buy).await,
            Signal::Advice(Side::Sell) => {
                // Check the position ourselves instead of relying on the
                // brokerage to reject an oversized liquidation.
                let held = self.held_quantity().await?;
                if held < self.config.trade_qty {
                    warn!(
                        "Sell signal skipped: held {} {} is below trade qty {}",
                        held, self.config.symbol, self.config.trade_qty
                    );
                } else {
                    self.submit(Side::Sell).await;
                }
            }
            Signal::Hold => info!("No signal this cycle"),
        }

        Ok(())
    }

    async fn held_quantity(&self) -> Result<Decimal> {
        let positions = self
            .trading
            .get_positions()
            .await
            .context("position fetch failed")?;

        // Positions may report the symbol without the slash ("BTCUSD").
        let stripped = self.config.symbol.replace('/', "");
        Ok(positions
            .iter()
            .filter(|p| p.symbol == self.config.symbol || p.symbol == stripped)
            .map(|p| p.quantity)
            .sum())
    }

    async fn submit(&self, side: Side) {
        match self
            .trading
            .submit_market_order(&self.config.symbol, side, self.config.trade_qty)
            .await
        {
            Ok(order) => info!(
                "✅ Order confirmed: id={} side={} status={}",
                order.id,
                order.side.as_str(),
                order.status
            ),
            // Best-effort policy: a failed order never crashes the scheduler.
            Err(e) => error!("⚠️ Order submission failed: {}", e),
        }
    }
}

/// Start of the bar fetch window: `lookback` before `end`, aligned down to
/// the hour boundary. Bars are hour-aligned, so without this a cycle firing
/// at a minute offset would shift the first returned bar forward past the
/// instant one lookback ago.
pub fn bar_window_start(end: DateTime<Utc>, lookback: chrono::Duration) -> DateTime<Utc> {
    let start = end - lookback;
    start
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(start)
}

/// Delay until the next scheduled cycle. With an hourly interval and a
/// minute offset configured the bot fires at that wall-clock minute; any
/// other interval runs as-is and the offset is ignored.
pub fn delay_until_next_tick(
    interval_secs: u64,
    minute_offset: Option<u32>,
    now: DateTime<Utc>,
) -> Duration {
    if let (3600, Some(minute)) = (interval_secs, minute_offset) {
        let target = now
            .with_minute(minute.min(59))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0));

        if let Some(mut target) = target {
            if target <= now {
                target += chrono::Duration::hours(1);
            }
            if let Ok(delay) = (target - now).to_std() {
                return delay;
            }
        }
    }

    Duration::from_secs(interval_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bar_window_start_aligns_down_to_the_hour() {
        let end = Utc.with_ymd_and_hms(2023, 2, 2, 10, 30, 0).unwrap();
        let start = bar_window_start(end, chrono::Duration::hours(24));
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 2, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn bar_window_start_on_the_hour_is_unchanged() {
        let end = Utc.with_ymd_and_hms(2023, 2, 2, 10, 0, 0).unwrap();
        let start = bar_window_start(end, chrono::Duration::hours(24));
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 2, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn minute_offset_aligns_to_next_hour_mark() {
        let now = Utc.with_ymd_and_hms(2023, 2, 1, 10, 15, 0).unwrap();
        let delay = delay_until_next_tick(3600, Some(30), now);
        assert_eq!(delay, Duration::from_secs(15 * 60));
    }

    #[test]
    fn minute_offset_in_the_past_rolls_over() {
        let now = Utc.with_ymd_and_hms(2023, 2, 1, 10, 45, 0).unwrap();
        let delay = delay_until_next_tick(3600, Some(30), now);
        assert_eq!(delay, Duration::from_secs(45 * 60));
    }

    #[test]
    fn minute_offset_only_applies_to_hourly_interval() {
        let now = Utc.with_ymd_and_hms(2023, 2, 1, 10, 15, 0).unwrap();
        let delay = delay_until_next_tick(5, Some(30), now);
        assert_eq!(delay, Duration::from_secs(5));
    }

    #[test]
    fn no_offset_uses_plain_interval() {
        let now = Utc.with_ymd_and_hms(2023, 2, 1, 10, 45, 12).unwrap();
        let delay = delay_until_next_tick(5, None, now);
        assert_eq!(delay, Duration::from_secs(5));
    }
}
