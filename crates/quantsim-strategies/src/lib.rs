//! Trading strategy implementations.
//!
//! This crate provides the closed set of strategy variants:
//! - Moving Average Crossover
//! - Mean Reversion
//! - Momentum/RSI
//!
//! plus the registry that constructs them from a kind and a parameter map.

mod ma_crossover;
mod mean_reversion;
mod momentum;
mod registry;

pub use ma_crossover::{MaCrossoverConfig, MaCrossoverStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use momentum::{MomentumConfig, MomentumStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
