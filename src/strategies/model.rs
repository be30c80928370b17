use crate::strategies::traits::Strategy;
use crate::types::{PriceBar, Side, Signal};
use anyhow::{anyhow, ensure, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use ta::indicators::{ExponentialMovingAverage, RelativeStrengthIndex};
use ta::Next;
use tracing::info;

/// Indicator feature the offline trainer selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "indicator", rename_all = "snake_case")]
pub enum Feature {
    Rsi { period: usize },
    /// Relative distance of the last close from its EMA.
    EmaDistance { period: usize },
    /// Percent change of the last close vs the close `offset` bars earlier.
    PercentReturn { offset: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    #[serde(flatten)]
    pub feature: Feature,
    pub weight: f64,
}

/// Serialized regression model produced by the offline training pipeline.
/// Predicts the next-hour percent return from technical indicator features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub intercept: f64,
    /// Scores inside `[-threshold, threshold]` are treated as no signal.
    pub threshold: f64,
    pub terms: Vec<Term>,
}

pub struct ModelStrategy {
    artifact: ModelArtifact,
    lookback: Duration,
}

impl ModelStrategy {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&data).context("failed to parse model artifact")?;
        Ok(Self::new(artifact))
    }

    pub fn new(artifact: ModelArtifact) -> Self {
        let max_period = artifact
            .terms
            .iter()
            .map(|t| match t.feature {
                Feature::Rsi { period } | Feature::EmaDistance { period } => period,
                Feature::PercentReturn { offset } => offset + 1,
            })
            .max()
            .unwrap_or(1);

        // Triple the longest period so the recursive indicators settle
        // before the value we actually read, capped at the 1000 bars a
        // single page of the bars endpoint can return.
        let hours = (max_period as i64 * 3).clamp(24, 1000);

        Self {
            artifact,
            lookback: Duration::hours(hours),
        }
    }

    fn score(&self, bars: &[PriceBar]) -> Result<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut score = self.artifact.intercept;
        for term in &self.artifact.terms {
            score += term.weight * feature_value(&term.feature, &closes)?;
        }
        Ok(score)
    }
}

impl Strategy for ModelStrategy {
    fn name(&self) -> &str {
        "model"
    }

    fn lookback(&self) -> Duration {
        self.lookback
    }

    fn evaluate(&self, bars: &[PriceBar]) -> Result<Signal> {
        let score = self.score(bars)?;
        let threshold = self.artifact.threshold;

        let signal = if score > threshold {
            Signal::Advice(Side::Buy)
        } else if score < -threshold {
            Signal::Advice(Side::Sell)
        } else {
            Signal::Hold
        };

        info!(
            "Model score {:.4} (threshold {:.4}) -> {:?}",
            score, threshold, signal
        );

        Ok(signal)
    }
}

fn feature_value(feature: &Feature, closes: &[f64]) -> Result<f64> {
    match *feature {
        Feature::Rsi { period } => {
            ensure!(
                closes.len() > period,
                "not enough bars for RSI({period}): have {}",
                closes.len()
            );
            let mut rsi = RelativeStrengthIndex::new(period)
                .map_err(|e| anyhow!("invalid RSI period {period}: {e}"))?;
            let mut value = 50.0;
            for close in closes {
                value = rsi.next(*close);
            }
            Ok(value)
        }
        Feature::EmaDistance { period } => {
            ensure!(
                closes.len() > period,
                "not enough bars for EMA({period}): have {}",
                closes.len()
            );
            let mut ema = ExponentialMovingAverage::new(period)
                .map_err(|e| anyhow!("invalid EMA period {period}: {e}"))?;
            let mut value = 0.0;
            for close in closes {
                value = ema.next(*close);
            }
            ensure!(value != 0.0, "EMA({period}) collapsed to zero");
            let last = closes[closes.len() - 1];
            Ok((last - value) / value)
        }
        Feature::PercentReturn { offset } => {
            ensure!(offset > 0, "percent return offset must be positive");
            ensure!(
                closes.len() > offset,
                "not enough bars for a {offset}-bar return: have {}",
                closes.len()
            );
            let last = closes[closes.len() - 1];
            let earlier = closes[closes.len() - 1 - offset];
            ensure!(earlier != 0.0, "reference close is zero");
            Ok((last - earlier) / earlier * 100.0)
        }
    }
}
