//! Momentum indicators.

use crate::Indicator;

/// Relative Strength Index (RSI) over simple mean gain / mean loss.
///
/// `RSI = 100 - 100 / (1 + RS)` where `RS` is the mean gain divided by the
/// mean loss over the window. A zero mean loss saturates the RSI at 100
/// rather than dividing by zero.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator. Common periods are 14 or 9.
    pub fn new(period: usize) -> Self {
        debug_assert!(period > 0, "period must be greater than 0");
        Self { period }
    }

    /// RSI of the most recent window, or `None` when fewer than
    /// `period + 1` values are available.
    pub fn latest(&self, data: &[f64]) -> Option<f64> {
        if data.len() <= self.period || self.period == 0 {
            return None;
        }
        let window = &data[data.len() - self.period - 1..];

        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for pair in window.windows(2) {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                gain_sum += change;
            } else {
                loss_sum += -change;
            }
        }

        let mean_gain = gain_sum / self.period as f64;
        let mean_loss = loss_sum / self.period as f64;

        if mean_loss == 0.0 {
            return Some(100.0);
        }
        let rs = mean_gain / mean_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

impl Indicator for Rsi {
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period || self.period == 0 {
            return vec![];
        }
        (self.period..data.len())
            .filter_map(|i| self.latest(&data[..=i]))
            .collect()
    }

    fn period(&self) -> usize {
        // One extra point is needed for the first price change.
        self.period + 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// Cumulative return over the last `period` steps:
/// `close[t] / close[t - period] - 1`. `None` when fewer than `period + 1`
/// values are available.
pub fn cumulative_return(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() <= period {
        return None;
    }
    let current = *data.last()?;
    let base = data[data.len() - 1 - period];
    if base == 0.0 {
        return None;
    }
    Some(current / base - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_all_gains_saturates() {
        let rsi = Rsi::new(3);
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(rsi.latest(&data), Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::new(3);
        let data = vec![4.0, 3.0, 2.0, 1.0];
        let value = rsi.latest(&data).unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn test_rsi_balanced() {
        let rsi = Rsi::new(2);
        // One gain of 2, one loss of 2: RS = 1, RSI = 50.
        let data = vec![10.0, 12.0, 10.0];
        let value = rsi.latest(&data).unwrap();
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let rsi = Rsi::new(14);
        assert_eq!(rsi.latest(&[1.0, 2.0, 3.0]), None);
        assert!(rsi.calculate(&[1.0, 2.0, 3.0]).is_empty());
    }

    #[test]
    fn test_cumulative_return() {
        let data = vec![100.0, 105.0, 110.0];
        let value = cumulative_return(&data, 2).unwrap();
        assert!((value - 0.10).abs() < 1e-9);

        assert_eq!(cumulative_return(&data, 3), None);
    }
}
