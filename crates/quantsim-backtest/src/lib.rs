//! Backtesting over historical bars.
//!
//! [`BacktestEngine`] replays a merged multi-symbol bar stream through a
//! strategy and a single portfolio, producing an immutable
//! [`BacktestResult`] with performance [`Metrics`]. [`Optimizer`] sweeps a
//! [`ParameterGrid`] over the engine in parallel.

mod engine;
mod metrics;
mod optimizer;
mod report;

pub use engine::{BacktestConfig, BacktestEngine, BacktestResult, RunStatus};
pub use metrics::Metrics;
pub use optimizer::{
    OptimizeMetric, OptimizeReport, Optimizer, OptimizerConfig, OptimizerRun, ParameterGrid,
};
