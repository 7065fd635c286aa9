//! Mean Reversion Strategy.
//!
//! Compares the current close to the mean of the last `lookback` closes.
//! Deviation beyond the threshold generates a fade: sell when stretched
//! above the mean, buy when stretched below it.

use serde::{Deserialize, Serialize};

use quantsim_core::{
    error::StrategyError,
    traits::{Strategy, StrategyKind},
    types::{BarSeries, Signal, SignalKind},
};
use quantsim_indicators::Sma;

/// Configuration for the Mean Reversion strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    /// Number of closes to average
    pub lookback: usize,
    /// Fractional deviation from the mean that triggers a signal
    pub threshold: f64,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            threshold: 0.02,
        }
    }
}

impl MeanReversionConfig {
    /// Validate at construction time, before any bar is processed.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback < 2 {
            return Err(StrategyError::InvalidConfig(
                "Lookback must be at least 2".into(),
            ));
        }
        if self.threshold <= 0.0 || !self.threshold.is_finite() {
            return Err(StrategyError::InvalidConfig(
                "Threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Mean Reversion Strategy.
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
    mean: Sma,
    initialized: bool,
}

impl MeanReversionStrategy {
    /// Create a new Mean Reversion strategy with validated configuration.
    pub fn new(config: MeanReversionConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let mean = Sma::new(config.lookback);
        Ok(Self {
            config,
            mean,
            initialized: false,
        })
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        "Mean Reversion"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn description(&self) -> &str {
        "Fades deviations from the rolling mean close"
    }

    fn initialize(&mut self, _prior_history: &BarSeries) {
        self.initialized = true;
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn generate_signal(&self, series: &BarSeries) -> Signal {
        let bar = match series.last() {
            Some(bar) => bar,
            None => return Signal::hold(&series.symbol, 0),
        };

        if series.len() < self.config.lookback {
            return Signal::hold(&bar.symbol, bar.timestamp);
        }

        let closes = series.closes();
        let mean = match self.mean.latest(&closes) {
            Some(mean) if mean > 0.0 => mean,
            _ => return Signal::hold(&bar.symbol, bar.timestamp),
        };

        let deviation = (bar.close - mean) / mean;
        // Scaled so confidence is 0.5 at the trigger and saturates at
        // twice the threshold.
        let confidence = (deviation.abs() / (2.0 * self.config.threshold)).min(1.0);

        if deviation > self.config.threshold {
            Signal::actionable(
                &bar.symbol,
                SignalKind::Sell,
                confidence,
                bar.timestamp,
                bar.close,
                format!(
                    "Close {:.2} stretched {:.2}% above mean {:.2}",
                    bar.close,
                    deviation * 100.0,
                    mean
                ),
            )
        } else if deviation < -self.config.threshold {
            Signal::actionable(
                &bar.symbol,
                SignalKind::Buy,
                confidence,
                bar.timestamp,
                bar.close,
                format!(
                    "Close {:.2} stretched {:.2}% below mean {:.2}",
                    bar.close,
                    deviation.abs() * 100.0,
                    mean
                ),
            )
        } else {
            Signal::hold(&bar.symbol, bar.timestamp)
        }
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn warmup_period(&self) -> usize {
        self.config.lookback
    }
}
