//! Strategy trait definitions.

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::types::{BarSeries, Signal};

/// The closed set of strategy variants. Dispatch over kinds is exhaustive
/// and statically checkable; new variants extend this enum and the
/// registry, never the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MaCrossover,
    MeanReversion,
    Momentum,
}

impl StrategyKind {
    /// All known kinds, in registry listing order.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::MaCrossover,
        StrategyKind::MeanReversion,
        StrategyKind::Momentum,
    ];

    /// Stable identifier used on the CLI and in config files.
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::MaCrossover => "ma_crossover",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::Momentum => "momentum",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ma_crossover" => Ok(StrategyKind::MaCrossover),
            "mean_reversion" => Ok(StrategyKind::MeanReversion),
            "momentum" => Ok(StrategyKind::Momentum),
            other => Err(StrategyError::NotFound(other.to_string())),
        }
    }
}

/// Core strategy trait.
///
/// A strategy is data plus a pure transformation from bar history to a
/// signal. `generate_signal` must depend only on its inputs — no wall
/// clock, no randomness — so identical inputs always yield an identical
/// signal. That determinism is what makes backtests reproducible and
/// optimizer rankings meaningful.
pub trait Strategy: Send + Sync {
    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Which variant this is.
    fn kind(&self) -> StrategyKind;

    /// One-time setup before a run. Idempotent and side-effect-free apart
    /// from marking the strategy initialized.
    fn initialize(&mut self, prior_history: &BarSeries);

    /// Whether `initialize` has been called.
    fn is_initialized(&self) -> bool;

    /// Produce a signal given all prior bars for the symbol, including the
    /// current bar (bar-close based; no look-ahead). Insufficient history
    /// yields a neutral hold, never an error.
    fn generate_signal(&self, series: &BarSeries) -> Signal;

    /// The strategy's parameters as a flat key -> value mapping.
    fn parameters(&self) -> serde_json::Value;

    /// Number of bars needed before the strategy can act.
    fn warmup_period(&self) -> usize;

    /// Short description for listings.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.id().parse::<StrategyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("martingale".parse::<StrategyKind>().is_err());
    }
}
