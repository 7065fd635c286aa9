//! Backtest engine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use quantsim_core::cancel::CancelToken;
use quantsim_core::error::{EngineError, EngineResult};
use quantsim_core::traits::{MarketDataProvider, Strategy};
use quantsim_core::types::{Bar, BarSeries, Portfolio, Signal};

use crate::metrics::Metrics;

/// Minimum rolling history kept per symbol during a run. The effective
/// capacity grows with the strategy's warmup so a large window is never
/// starved of the bars it needs.
const MIN_SERIES_CAPACITY: usize = 500;

/// Backtest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Initial cash
    pub initial_capital: Decimal,
    /// Commission as a fraction of traded notional
    pub commission_rate: Decimal,
    /// Fraction of cash targeted per new position, in (0, 1]
    pub max_position_fraction: Decimal,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100000),
            commission_rate: dec!(0.001),
            max_position_fraction: dec!(0.5),
        }
    }
}

/// Terminal state of a run. Present on results and optimizer run records;
/// a run that errors produces no partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Immutable outcome of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Strategy name
    pub strategy: String,
    /// Parameters the strategy ran with, as a flat mapping
    pub parameters: serde_json::Value,
    /// Terminal run state
    pub status: RunStatus,
    /// Starting cash
    pub initial_capital: Decimal,
    /// Final equity: cash plus open positions at last seen closes
    pub final_value: Decimal,
    /// Final portfolio snapshot, trade ledger included
    pub portfolio: Portfolio,
    /// Every generated signal in execution order, one per processed bar
    /// (holds included)
    pub signals: Vec<Signal>,
    /// Performance metrics
    pub metrics: Metrics,
}

/// Single-pass backtest engine.
///
/// Replays bars for all symbols in one chronological stream against one
/// strategy and one portfolio. Identical inputs produce identical results;
/// there is no clock, randomness or cross-run state.
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Run a backtest over `[start, end)`.
    ///
    /// A fetch failure for any symbol fails the whole run. Cancellation is
    /// observed between bars and surfaces as [`EngineError::Cancelled`].
    pub async fn run(
        &self,
        strategy: &mut dyn Strategy,
        provider: &dyn MarketDataProvider,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> EngineResult<BacktestResult> {
        if symbols.is_empty() {
            return Err(EngineError::Config("no symbols given".to_string()));
        }

        let mut all_bars: Vec<Bar> = Vec::new();
        for symbol in symbols {
            let bars = provider.fetch_historical(symbol, start, end).await?;
            debug!(symbol, count = bars.len(), provider = provider.name(), "fetched history");
            all_bars.extend(bars);
        }

        // Chronological merge. Timestamp ties break on symbol so interleaving
        // across symbols is stable and reproducible.
        all_bars.sort_by(|a, b| {
            (a.timestamp, a.symbol.as_str()).cmp(&(b.timestamp, b.symbol.as_str()))
        });

        strategy.initialize(&BarSeries::new(""));
        let series_capacity = MIN_SERIES_CAPACITY.max(strategy.warmup_period() + 1);

        let mut portfolio = Portfolio::new(
            self.config.initial_capital,
            self.config.max_position_fraction,
            self.config.commission_rate,
        );
        let mut series_map: HashMap<String, BarSeries> = symbols
            .iter()
            .map(|s| (s.clone(), BarSeries::with_capacity(s.clone(), series_capacity)))
            .collect();
        let mut last_closes: HashMap<String, Decimal> = HashMap::new();
        let mut signals: Vec<Signal> = Vec::new();
        let bar_count = all_bars.len();

        for bar in all_bars {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            if let Ok(close) = Decimal::try_from(bar.close) {
                last_closes.insert(bar.symbol.clone(), close);
            }

            let series = match series_map.get_mut(&bar.symbol) {
                Some(series) => series,
                None => continue,
            };
            series.push(bar.clone());

            let signal = strategy.generate_signal(series);
            if let Some(trade) = portfolio.apply_signal(&signal, &bar) {
                info!(
                    symbol = %trade.symbol,
                    side = %trade.side,
                    quantity = %trade.quantity,
                    price = %trade.price,
                    pnl = ?trade.pnl,
                    "trade executed"
                );
            }
            signals.push(signal);
        }

        let final_value = portfolio.equity(&last_closes);
        let metrics = Metrics::compute(self.config.initial_capital, final_value, &portfolio.trades);
        debug!(
            bars = bar_count,
            trades = portfolio.trades.len(),
            final_value = %final_value,
            "backtest complete"
        );

        Ok(BacktestResult {
            strategy: strategy.name().to_string(),
            parameters: strategy.parameters(),
            status: RunStatus::Completed,
            initial_capital: self.config.initial_capital,
            final_value,
            portfolio,
            signals,
            metrics,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use quantsim_core::error::DataError;
    use quantsim_strategies::{MaCrossoverConfig, MaCrossoverStrategy};
    use tokio::sync::mpsc;

    /// In-memory provider with fixed per-symbol bar lists.
    pub(crate) struct StaticProvider {
        pub data: HashMap<String, Vec<Bar>>,
    }

    #[async_trait]
    impl MarketDataProvider for StaticProvider {
        async fn fetch_historical(
            &self,
            symbol: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Bar>, DataError> {
            let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis());
            let bars: Vec<Bar> = self
                .data
                .get(symbol)
                .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?
                .iter()
                .filter(|b| b.timestamp >= start_ms && b.timestamp < end_ms)
                .cloned()
                .collect();
            if bars.is_empty() {
                return Err(DataError::NoDataAvailable {
                    symbol: symbol.to_string(),
                });
            }
            Ok(bars)
        }

        async fn subscribe(&self, symbol: &str) -> Result<mpsc::Receiver<Bar>, DataError> {
            Err(DataError::FeedClosed(symbol.to_string()))
        }

        async fn current_price(&self, symbol: &str) -> Result<f64, DataError> {
            self.data
                .get(symbol)
                .and_then(|bars| bars.last())
                .map(|b| b.close)
                .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn bar(symbol: &str, day: i64, close: f64) -> Bar {
        Bar::new(
            symbol,
            day * 86_400_000,
            close,
            close + 1.0,
            (close - 1.0).max(0.1),
            close,
            1000.0,
        )
    }

    fn wave_data(symbol: &str, days: i64) -> Vec<Bar> {
        (0..days)
            .map(|i| bar(symbol, i, 100.0 + (i as f64 * 0.4).sin() * 10.0))
            .collect()
    }

    fn range(days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            DateTime::from_timestamp_millis(0).unwrap(),
            DateTime::from_timestamp_millis(days * 86_400_000).unwrap(),
        )
    }

    fn strategy() -> MaCrossoverStrategy {
        MaCrossoverStrategy::new(MaCrossoverConfig {
            short_window: 3,
            long_window: 8,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_completes_with_trades() {
        let provider = StaticProvider {
            data: HashMap::from([("TEST".to_string(), wave_data("TEST", 100))]),
        };
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut strategy = strategy();
        let (start, end) = range(100);

        let result = engine
            .run(
                &mut strategy,
                &provider,
                &["TEST".to_string()],
                start,
                end,
                &CancelToken::default(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert!(!result.portfolio.trades.is_empty());
        // One signal per processed bar, holds included.
        assert_eq!(result.signals.len(), 100);
        assert!(result.signals.iter().any(|s| !s.is_hold()));
        assert!(result.portfolio.cash >= Decimal::ZERO);
        assert!(result.final_value > Decimal::ZERO);
        assert_eq!(result.metrics.total_trades, result.portfolio.trades.len());
    }

    #[tokio::test]
    async fn test_run_is_deterministic() {
        let data = HashMap::from([("TEST".to_string(), wave_data("TEST", 80))]);
        let engine = BacktestEngine::new(BacktestConfig::default());
        let (start, end) = range(80);

        let mut results = Vec::new();
        for _ in 0..2 {
            let provider = StaticProvider { data: data.clone() };
            let mut strategy = strategy();
            let result = engine
                .run(
                    &mut strategy,
                    &provider,
                    &["TEST".to_string()],
                    start,
                    end,
                    &CancelToken::default(),
                )
                .await
                .unwrap();
            results.push(result);
        }

        assert_eq!(results[0].final_value, results[1].final_value);
        assert_eq!(results[0].signals, results[1].signals);
        assert_eq!(
            results[0].portfolio.trades.len(),
            results[1].portfolio.trades.len()
        );
    }

    #[tokio::test]
    async fn test_timestamp_ties_break_on_symbol() {
        // Same timestamps for both symbols; signals must interleave
        // lexicographically within each timestamp.
        let data = HashMap::from([
            ("AAA".to_string(), wave_data("AAA", 60)),
            ("BBB".to_string(), wave_data("BBB", 60)),
        ]);
        let provider = StaticProvider { data };
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut strategy = strategy();
        let (start, end) = range(60);

        let result = engine
            .run(
                &mut strategy,
                &provider,
                &["AAA".to_string(), "BBB".to_string()],
                start,
                end,
                &CancelToken::default(),
            )
            .await
            .unwrap();

        assert!(result
            .signals
            .windows(2)
            .all(|w| (w[0].timestamp, w[0].symbol.as_str())
                <= (w[1].timestamp, w[1].symbol.as_str())));
    }

    #[tokio::test]
    async fn test_window_larger_than_default_history_still_signals() {
        use quantsim_core::types::SignalKind;

        // 600 flat bars then a steady rally. A long window above the
        // default rolling capacity must still see enough history to act.
        let bars: Vec<Bar> = (0..700i64)
            .map(|i| {
                let close = if i < 600 {
                    100.0
                } else {
                    100.0 + (i - 599) as f64
                };
                bar("TEST", i, close)
            })
            .collect();
        let provider = StaticProvider {
            data: HashMap::from([("TEST".to_string(), bars)]),
        };
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut strategy = MaCrossoverStrategy::new(MaCrossoverConfig {
            short_window: 2,
            long_window: 501,
        })
        .unwrap();
        let (start, end) = range(700);

        let result = engine
            .run(
                &mut strategy,
                &provider,
                &["TEST".to_string()],
                start,
                end,
                &CancelToken::default(),
            )
            .await
            .unwrap();

        assert!(result.signals.iter().any(|s| s.kind == SignalKind::Buy));
        assert!(!result.portfolio.trades.is_empty());
    }

    #[tokio::test]
    async fn test_missing_symbol_fails_whole_run() {
        let provider = StaticProvider {
            data: HashMap::from([("TEST".to_string(), wave_data("TEST", 50))]),
        };
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut strategy = strategy();
        let (start, end) = range(50);

        let result = engine
            .run(
                &mut strategy,
                &provider,
                &["TEST".to_string(), "MISSING".to_string()],
                start,
                end,
                &CancelToken::default(),
            )
            .await;

        assert!(matches!(result, Err(EngineError::Data(_))));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_run() {
        let provider = StaticProvider {
            data: HashMap::from([("TEST".to_string(), wave_data("TEST", 50))]),
        };
        let engine = BacktestEngine::new(BacktestConfig::default());
        let mut strategy = strategy();
        let (start, end) = range(50);

        let cancel = CancelToken::default();
        cancel.cancel();
        let result = engine
            .run(&mut strategy, &provider, &["TEST".to_string()], start, end, &cancel)
            .await;

        assert!(matches!(result, Err(EngineError::Cancelled)));
    }
}
