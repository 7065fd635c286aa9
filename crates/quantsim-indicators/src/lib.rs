//! Technical indicators used by the strategy variants.

mod momentum;
mod moving_average;

pub use momentum::{cumulative_return, Rsi};
pub use moving_average::Sma;

/// A technical indicator computed over a price series.
pub trait Indicator {
    /// Calculate indicator values over the data. Returns an empty vector
    /// when the series is shorter than the required period.
    fn calculate(&self, data: &[f64]) -> Vec<f64>;

    /// Minimum number of data points required for one output value.
    fn period(&self) -> usize;

    /// Indicator name.
    fn name(&self) -> &str;
}
