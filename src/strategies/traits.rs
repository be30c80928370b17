// src/strategies/traits.rs
use crate::types::{PriceBar, Signal};
use anyhow::Result;
use chrono::Duration;

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// How much bar history the engine should fetch before evaluating.
    fn lookback(&self) -> Duration {
        Duration::hours(24)
    }

    /// Derive a signal from the fetched bars. Bars arrive in ascending
    /// timestamp order and the slice is never empty.
    fn evaluate(&self, bars: &[PriceBar]) -> Result<Signal>;
}
