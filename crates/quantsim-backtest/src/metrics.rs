//! Performance metrics.
//!
//! A pure fold over the trade ledger plus initial and final value. Every
//! degenerate input (no trades, one trade, zero variance) resolves to 0 so
//! callers never branch on metric errors. All ratios are fractions, not
//! percentages.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quantsim_core::types::Trade;

/// Backtest performance summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// (final − initial) / initial
    pub total_return: f64,
    /// Per-trade Sharpe: mean(pnl) / stddev(pnl). Not annualized; 0 with
    /// fewer than two closed trades or zero variance.
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough decline of the cumulative-P&L equity series,
    /// as a fraction. Always <= 0.
    pub max_drawdown: f64,
    /// Winning trades / closed trades (0 when no trades closed)
    pub win_rate: f64,
    /// Mean P&L of winning trades (0 when none)
    pub avg_win: f64,
    /// Mean P&L of losing trades, negative (0 when none)
    pub avg_loss: f64,
    /// All executed trades, entries included
    pub total_trades: usize,
    /// Closed trades with positive P&L
    pub winning_trades: usize,
    /// Closed trades with negative P&L
    pub losing_trades: usize,
}

impl Metrics {
    /// Compute metrics from the trade ledger.
    ///
    /// Only sell trades carry P&L; buys count toward `total_trades` only.
    pub fn compute(initial_capital: Decimal, final_value: Decimal, trades: &[Trade]) -> Self {
        let initial = initial_capital.to_f64().unwrap_or(0.0);
        let fin = final_value.to_f64().unwrap_or(0.0);

        let total_return = if initial > 0.0 {
            (fin - initial) / initial
        } else {
            0.0
        };

        let pnls: Vec<f64> = trades
            .iter()
            .filter_map(|t| t.pnl)
            .map(|p| p.to_f64().unwrap_or(0.0))
            .collect();

        let winning: Vec<f64> = pnls.iter().copied().filter(|&p| p > 0.0).collect();
        let losing: Vec<f64> = pnls.iter().copied().filter(|&p| p < 0.0).collect();

        let win_rate = if pnls.is_empty() {
            0.0
        } else {
            winning.len() as f64 / pnls.len() as f64
        };

        Self {
            total_return,
            sharpe_ratio: sharpe(&pnls),
            max_drawdown: max_drawdown(initial, &pnls),
            win_rate,
            avg_win: mean(&winning),
            avg_loss: mean(&losing),
            total_trades: trades.len(),
            winning_trades: winning.len(),
            losing_trades: losing.len(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Per-trade Sharpe ratio over closed-trade P&L.
fn sharpe(pnls: &[f64]) -> f64 {
    if pnls.len() < 2 {
        return 0.0;
    }
    let mean_pnl = mean(pnls);
    let variance = pnls.iter().map(|p| (p - mean_pnl).powi(2)).sum::<f64>() / pnls.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev > 0.0 {
        mean_pnl / std_dev
    } else {
        0.0
    }
}

/// Worst fractional drawdown of the equity series built from initial cash
/// plus cumulative per-trade P&L. The peak is seeded with the start value,
/// so the result is always <= 0.
fn max_drawdown(initial: f64, pnls: &[f64]) -> f64 {
    let mut equity = initial;
    let mut peak = initial;
    let mut worst = 0.0f64;

    for pnl in pnls {
        equity += pnl;
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            worst = worst.min((equity - peak) / peak);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantsim_core::types::Side;
    use rust_decimal_macros::dec;

    fn closed_trade(pnl: Decimal) -> Trade {
        Trade {
            side: Side::Sell,
            symbol: "TEST".to_string(),
            quantity: dec!(10),
            price: dec!(100),
            commission: Decimal::ZERO,
            timestamp: 0,
            pnl: Some(pnl),
        }
    }

    fn entry_trade() -> Trade {
        Trade {
            side: Side::Buy,
            symbol: "TEST".to_string(),
            quantity: dec!(10),
            price: dec!(100),
            commission: Decimal::ZERO,
            timestamp: 0,
            pnl: None,
        }
    }

    #[test]
    fn test_no_trades_all_zero() {
        let metrics = Metrics::compute(dec!(1000), dec!(1000), &[]);
        assert_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.total_trades, 0);
    }

    #[test]
    fn test_total_return_fraction() {
        let metrics = Metrics::compute(dec!(1000), dec!(1100), &[]);
        assert!((metrics.total_return - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_win_rate_counts_closed_trades_only() {
        let trades = vec![
            entry_trade(),
            closed_trade(dec!(50)),
            entry_trade(),
            closed_trade(dec!(-25)),
        ];
        let metrics = Metrics::compute(dec!(1000), dec!(1025), &trades);

        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.winning_trades, 1);
        assert_eq!(metrics.losing_trades, 1);
        assert!((metrics.win_rate - 0.5).abs() < 1e-12);
        assert!((metrics.avg_win - 50.0).abs() < 1e-12);
        assert!((metrics.avg_loss - (-25.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_known_values() {
        // pnls [10, 20]: mean 15, population stddev 5 -> 3.0
        let trades = vec![closed_trade(dec!(10)), closed_trade(dec!(20))];
        let metrics = Metrics::compute(dec!(1000), dec!(1030), &trades);
        assert!((metrics.sharpe_ratio - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sharpe_degenerate_cases() {
        // A single closed trade has no spread to measure.
        let one = vec![closed_trade(dec!(10))];
        assert_eq!(Metrics::compute(dec!(1000), dec!(1010), &one).sharpe_ratio, 0.0);

        // Identical P&Ls give zero variance.
        let flat = vec![closed_trade(dec!(10)), closed_trade(dec!(10))];
        assert_eq!(Metrics::compute(dec!(1000), dec!(1020), &flat).sharpe_ratio, 0.0);
    }

    #[test]
    fn test_max_drawdown_is_non_positive() {
        // equity 1000 -> 1100 -> 900 -> 950; trough is (900-1100)/1100
        let trades = vec![
            closed_trade(dec!(100)),
            closed_trade(dec!(-200)),
            closed_trade(dec!(50)),
        ];
        let metrics = Metrics::compute(dec!(1000), dec!(950), &trades);
        assert!((metrics.max_drawdown - (-200.0 / 1100.0)).abs() < 1e-12);
        assert!(metrics.max_drawdown <= 0.0);
    }

    #[test]
    fn test_monotonic_gains_have_zero_drawdown() {
        let trades = vec![closed_trade(dec!(10)), closed_trade(dec!(20))];
        let metrics = Metrics::compute(dec!(1000), dec!(1030), &trades);
        assert_eq!(metrics.max_drawdown, 0.0);
    }
}
