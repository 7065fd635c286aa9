//! Core types and traits for the backtesting engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Signals, positions, trades and the portfolio
//! - The strategy and market-data-provider traits
//! - The error taxonomy and run-level cancellation token

pub mod cancel;
pub mod error;
pub mod traits;
pub mod types;

pub use cancel::CancelToken;
pub use error::{DataError, EngineError, EngineResult, StrategyError};
pub use traits::*;
pub use types::*;
