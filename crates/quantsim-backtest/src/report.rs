//! Result export and the human-readable report.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Value};

use crate::engine::BacktestResult;

impl BacktestResult {
    /// Flatten the result to its fixed export mapping.
    ///
    /// Keys are stable; ratios are fractions, not percentages, and
    /// `max_drawdown` is non-positive. `trades` and `signals` serialize the
    /// full ledgers.
    pub fn export(&self) -> Value {
        json!({
            "strategy": self.strategy,
            "parameters": self.parameters,
            "initial_capital": self.initial_capital.to_f64(),
            "final_value": self.final_value.to_f64(),
            "total_return": self.metrics.total_return,
            "sharpe_ratio": self.metrics.sharpe_ratio,
            "max_drawdown": self.metrics.max_drawdown,
            "win_rate": self.metrics.win_rate,
            "avg_win": self.metrics.avg_win,
            "avg_loss": self.metrics.avg_loss,
            "total_trades": self.metrics.total_trades,
            "winning_trades": self.metrics.winning_trades,
            "losing_trades": self.metrics.losing_trades,
            "trades": self.portfolio.trades,
            "signals": self.signals,
        })
    }

    /// Export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export())
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        s.push_str(&format!("  Parameters:          {}\n", self.parameters));
        s.push('\n');

        s.push_str("PERFORMANCE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Initial Capital:     ${:.2}\n",
            self.initial_capital
        ));
        s.push_str(&format!("  Final Value:         ${:.2}\n", self.final_value));
        s.push_str(&format!(
            "  Total Return:        {:.2}%\n",
            self.metrics.total_return * 100.0
        ));
        s.push_str(&format!(
            "  Max Drawdown:        {:.2}%\n",
            self.metrics.max_drawdown * 100.0
        ));
        s.push_str(&format!(
            "  Sharpe (per-trade):  {:.2}\n",
            self.metrics.sharpe_ratio
        ));
        s.push('\n');

        s.push_str("TRADE STATISTICS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Total Trades:        {}\n",
            self.metrics.total_trades
        ));
        s.push_str(&format!(
            "  Winning Trades:      {}\n",
            self.metrics.winning_trades
        ));
        s.push_str(&format!(
            "  Losing Trades:       {}\n",
            self.metrics.losing_trades
        ));
        s.push_str(&format!(
            "  Win Rate:            {:.2}%\n",
            self.metrics.win_rate * 100.0
        ));
        s.push_str(&format!("  Avg Win:             ${:.2}\n", self.metrics.avg_win));
        s.push_str(&format!("  Avg Loss:            ${:.2}\n", self.metrics.avg_loss));
        s.push_str(&format!("  Signals Emitted:     {}\n", self.signals.len()));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::DateTime;
    use quantsim_core::cancel::CancelToken;
    use rust_decimal::Decimal;

    use crate::engine::tests::StaticProvider;
    use crate::engine::{BacktestConfig, BacktestEngine};
    use quantsim_core::types::Bar;
    use quantsim_strategies::{MaCrossoverConfig, MaCrossoverStrategy};

    async fn sample_result() -> crate::engine::BacktestResult {
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.4).sin() * 10.0;
                Bar::new("TEST", i * 86_400_000, close, close + 1.0, close - 1.0, close, 1000.0)
            })
            .collect();
        let provider = StaticProvider {
            data: HashMap::from([("TEST".to_string(), bars)]),
        };
        let mut strategy = MaCrossoverStrategy::new(MaCrossoverConfig {
            short_window: 3,
            long_window: 8,
        })
        .unwrap();

        BacktestEngine::new(BacktestConfig::default())
            .run(
                &mut strategy,
                &provider,
                &["TEST".to_string()],
                DateTime::from_timestamp_millis(0).unwrap(),
                DateTime::from_timestamp_millis(60 * 86_400_000).unwrap(),
                &CancelToken::default(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_export_has_fixed_keys() {
        let result = sample_result().await;
        let export = result.export();

        for key in [
            "strategy",
            "parameters",
            "initial_capital",
            "final_value",
            "total_return",
            "sharpe_ratio",
            "max_drawdown",
            "win_rate",
            "avg_win",
            "avg_loss",
            "total_trades",
            "winning_trades",
            "losing_trades",
            "trades",
            "signals",
        ] {
            assert!(export.get(key).is_some(), "missing export key: {key}");
        }

        assert!(export["max_drawdown"].as_f64().unwrap() <= 0.0);
        assert_eq!(
            export["trades"].as_array().unwrap().len(),
            result.portfolio.trades.len()
        );
        // One signal per processed bar, holds included.
        assert_eq!(export["signals"].as_array().unwrap().len(), 60);
    }

    #[tokio::test]
    async fn test_summary_mentions_key_figures() {
        let result = sample_result().await;
        let summary = result.summary();

        assert!(summary.contains("BACKTEST REPORT"));
        assert!(summary.contains("Total Return"));
        assert!(summary.contains("Win Rate"));
        assert!(summary.contains(&result.strategy));
        assert!(result.initial_capital > Decimal::ZERO);
    }
}
