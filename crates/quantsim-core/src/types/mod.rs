//! Core data types for the backtesting engine.

mod bar;
mod portfolio;
mod position;
mod signal;
mod trade;

pub use bar::{Bar, BarSeries};
pub use portfolio::Portfolio;
pub use position::{Position, PositionStatus};
pub use signal::{Signal, SignalKind};
pub use trade::{Side, Trade};
