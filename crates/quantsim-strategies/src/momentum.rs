//! Momentum/RSI Strategy.
//!
//! Combines cumulative return over a momentum window with RSI: buys when
//! momentum is strongly positive while RSI reads oversold, sells when
//! momentum is strongly negative while RSI reads overbought.

use serde::{Deserialize, Serialize};

use quantsim_core::{
    error::StrategyError,
    traits::{Strategy, StrategyKind},
    types::{BarSeries, Signal, SignalKind},
};
use quantsim_indicators::{cumulative_return, Rsi};

/// Configuration for the Momentum/RSI strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Window for the cumulative-return calculation
    pub momentum_period: usize,
    /// RSI calculation period
    pub rsi_period: usize,
    /// Absolute cumulative return required to act
    pub momentum_threshold: f64,
    /// RSI at or below this is oversold
    pub oversold: f64,
    /// RSI at or above this is overbought
    pub overbought: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            momentum_period: 10,
            rsi_period: 14,
            momentum_threshold: 0.02,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl MomentumConfig {
    /// Validate at construction time, before any bar is processed.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.momentum_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Momentum period must be greater than 0".into(),
            ));
        }
        if self.rsi_period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.momentum_threshold <= 0.0 || !self.momentum_threshold.is_finite() {
            return Err(StrategyError::InvalidConfig(
                "Momentum threshold must be positive".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.oversold) || !(0.0..=100.0).contains(&self.overbought) {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// Momentum/RSI Strategy.
pub struct MomentumStrategy {
    config: MomentumConfig,
    rsi: Rsi,
    initialized: bool,
}

impl MomentumStrategy {
    /// Create a new Momentum strategy with validated configuration.
    pub fn new(config: MomentumConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let rsi = Rsi::new(config.rsi_period);
        Ok(Self {
            config,
            rsi,
            initialized: false,
        })
    }

    fn confidence(&self, rsi: f64) -> f64 {
        // More extreme RSI readings carry more conviction.
        if rsi <= 20.0 || rsi >= 80.0 {
            0.9
        } else {
            0.7
        }
    }
}

impl Strategy for MomentumStrategy {
    fn name(&self) -> &str {
        "Momentum/RSI"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn description(&self) -> &str {
        "Cumulative-return momentum gated by RSI extremes"
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

        let closes = series.closes();
        let momentum = cumulative_return(&closes, self.config.momentum_period);
        let rsi = self.rsi.latest(&closes);

        let (momentum, rsi) = match (momentum, rsi) {
            (Some(momentum), Some(rsi)) => (momentum, rsi),
            _ => return Signal::hold(&bar.symbol, bar.timestamp),
        };

        if momentum > self.config.momentum_threshold && rsi <= self.config.oversold {
            Signal::actionable(
                &bar.symbol,
                SignalKind::Buy,
                self.confidence(rsi),
                bar.timestamp,
                bar.close,
                format!(
                    "Momentum {:.2}% with oversold RSI {:.1}",
                    momentum * 100.0,
                    rsi
                ),
            )
        } else if momentum < -self.config.momentum_threshold && rsi >= self.config.overbought {
            Signal::actionable(
                &bar.symbol,
                SignalKind::Sell,
                self.confidence(rsi),
                bar.timestamp,
                bar.close,
                format!(
                    "Momentum {:.2}% with overbought RSI {:.1}",
                    momentum * 100.0,
                    rsi
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
        self.config.momentum_period.max(self.config.rsi_period) + 1
    }
}
