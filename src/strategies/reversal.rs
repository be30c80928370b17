use crate::strategies::traits::Strategy;
use crate::types::{PriceBar, Side, Signal};
use anyhow::{Context, Result};
use tracing::info;

/// Momentum-reversal heuristic over the bar recorded exactly one day ago.
///
/// With a 24h lookback the first fetched bar covers `[now-24h, now-23h)`.
/// A red bar back then (open above close) is read as an expected bounce up
/// now, and a green one as an expected pullback.
pub struct DailyReversal;

impl Strategy for DailyReversal {
    fn name(&self) -> &str {
        "reversal"
    }

    fn evaluate(&self, bars: &[PriceBar]) -> Result<Signal> {
        let bar = bars.first().context("no reference bar available")?;

        let signal = if bar.open > bar.close {
            Signal::Advice(Side::Buy)
        } else if bar.open < bar.close {
            Signal::Advice(Side::Sell)
        } else {
            Signal::Hold
        };

        info!(
            "Reference bar {}: open={} close={} -> {:?}",
            bar.timestamp, bar.open, bar.close, signal
        );

        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn bar(open: f64, close: f64) -> PriceBar {
        PriceBar {
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 10.0,
            timestamp: Utc::now() - Duration::hours(24),
        }
    }

    #[test]
    fn falling_bar_advises_buy() {
        let signal = DailyReversal.evaluate(&[bar(100.0, 95.0)]).unwrap();
        assert_eq!(signal, Signal::Advice(Side::Buy));
    }

    #[test]
    fn rising_bar_advises_sell() {
        let signal = DailyReversal.evaluate(&[bar(95.0, 100.0)]).unwrap();
        assert_eq!(signal, Signal::Advice(Side::Sell));
    }

    #[test]
    fn flat_bar_holds() {
        let signal = DailyReversal.evaluate(&[bar(100.0, 100.0)]).unwrap();
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn only_the_oldest_bar_counts() {
        // The day-old bar is red even though the latest bar is green.
        let bars = vec![bar(100.0, 95.0), bar(95.0, 100.0)];
        let signal = DailyReversal.evaluate(&bars).unwrap();
        assert_eq!(signal, Signal::Advice(Side::Buy));
    }

    #[test]
    fn empty_bars_are_an_error() {
        assert!(DailyReversal.evaluate(&[]).is_err());
    }
}
