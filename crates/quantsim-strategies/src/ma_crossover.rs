//! Moving Average Crossover Strategy.
//!
//! Compares the mean close over a short window against a long window:
//! short above long generates a buy, short below long a sell.

use serde::{Deserialize, Serialize};

use quantsim_core::{
    error::StrategyError,
    traits::{Strategy, StrategyKind},
    types::{BarSeries, Signal, SignalKind},
};
use quantsim_indicators::Sma;

/// Configuration for the MA Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaCrossoverConfig {
    /// Short moving average window
    pub short_window: usize,
    /// Long moving average window
    pub long_window: usize,
}

impl Default for MaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 10,
            long_window: 30,
        }
    }
}

impl MaCrossoverConfig {
    /// Validate at construction time, before any bar is processed.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.short_window == 0 {
            return Err(StrategyError::InvalidConfig(
                "Short window must be greater than 0".into(),
            ));
        }
        if self.short_window >= self.long_window {
            return Err(StrategyError::InvalidConfig(
                "Short window must be less than long window".into(),
            ));
        }
        Ok(())
    }
}

/// Moving Average Crossover Strategy.
pub struct MaCrossoverStrategy {
    config: MaCrossoverConfig,
    short: Sma,
    long: Sma,
    initialized: bool,
}

impl MaCrossoverStrategy {
    /// Create a new MA Crossover strategy with validated configuration.
    pub fn new(config: MaCrossoverConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let short = Sma::new(config.short_window);
        let long = Sma::new(config.long_window);
        Ok(Self {
            config,
            short,
            long,
            initialized: false,
        })
    }
}

impl Strategy for MaCrossoverStrategy {
    fn name(&self) -> &str {
        "MA Crossover"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MaCrossover
    }

    fn description(&self) -> &str {
        "Compares short-window vs long-window mean close"
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

        // Both windows need enough observations; thin history is a neutral
        // signal, not an error.
        if series.len() < self.config.long_window {
            return Signal::hold(&bar.symbol, bar.timestamp);
        }

        let closes = series.closes();
        let (short, long) = match (self.short.latest(&closes), self.long.latest(&closes)) {
            (Some(short), Some(long)) => (short, long),
            _ => return Signal::hold(&bar.symbol, bar.timestamp),
        };

        let divergence = if long != 0.0 {
            ((short - long) / long).abs()
        } else {
            0.0
        };

        if short > long {
            Signal::actionable(
                &bar.symbol,
                SignalKind::Buy,
                divergence.min(1.0),
                bar.timestamp,
                bar.close,
                format!(
                    "Short MA ({:.2}) above long MA ({:.2})",
                    short, long
                ),
            )
        } else if short < long {
            Signal::actionable(
                &bar.symbol,
                SignalKind::Sell,
                divergence.min(1.0),
                bar.timestamp,
                bar.close,
                format!(
                    "Short MA ({:.2}) below long MA ({:.2})",
                    short, long
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
        self.config.long_window
    }
}
