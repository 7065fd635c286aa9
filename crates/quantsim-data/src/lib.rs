//! Market data providers.
//!
//! Two [`MarketDataProvider`] implementations: a CSV directory source and a
//! deterministic synthetic generator. Both validate bars on ingest and
//! replay history over a bounded channel for the simulated-live mode.
//!
//! [`MarketDataProvider`]: quantsim_core::traits::MarketDataProvider

mod csv_source;
mod replay;
mod synthetic;

pub use csv_source::CsvProvider;
pub use synthetic::{SyntheticConfig, SyntheticProvider};
