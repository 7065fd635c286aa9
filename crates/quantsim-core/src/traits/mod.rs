//! Core trait definitions.

mod provider;
mod strategy;

pub use provider::MarketDataProvider;
pub use strategy::{Strategy, StrategyKind};
