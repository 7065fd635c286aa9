//! The staged pipeline.
//!
//! Producers forward provider feeds into a shared bar queue; one signal
//! task runs the strategy; one execution task owns the portfolio, so
//! portfolio state has a single writer and needs no locking. Queues are
//! bounded: a full queue logs a backpressure warning and then blocks the
//! sender, it never drops a bar.
//!
//! Shutdown is cooperative. Cancellation stops producers after their
//! in-flight bar; the closed bar queue ends the signal stage once drained,
//! and the closed signal queue ends the execution stage the same way. No
//! accepted item is lost.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use quantsim_core::cancel::CancelToken;
use quantsim_core::error::{EngineError, EngineResult};
use quantsim_core::traits::{MarketDataProvider, Strategy};
use quantsim_core::types::{Bar, BarSeries, Portfolio, Signal};

/// Minimum rolling history kept per symbol in the signal stage. The
/// effective capacity grows with the strategy's warmup so a large window
/// is never starved of the bars it needs.
const MIN_SERIES_CAPACITY: usize = 500;

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Capacity of the bar and signal queues
    pub queue_capacity: usize,
    /// Starting cash
    pub initial_capital: Decimal,
    /// Commission as a fraction of traded notional
    pub commission_rate: Decimal,
    /// Fraction of cash targeted per new position
    pub max_position_fraction: Decimal,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            initial_capital: dec!(100000),
            commission_rate: dec!(0.001),
            max_position_fraction: dec!(0.5),
        }
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Final portfolio, trade ledger included
    pub portfolio: Portfolio,
    /// Final equity at the last seen close per symbol
    pub final_value: Decimal,
    /// Bars consumed by the signal stage
    pub bars_processed: usize,
    /// Actionable (non-hold) signals emitted
    pub signals_generated: usize,
    /// Trades the execution stage actually filled
    pub trades_executed: usize,
}

/// Simulated-live pipeline over a provider's bar feeds.
pub struct RealtimePipeline {
    config: PipelineConfig,
}

impl RealtimePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until every feed is exhausted or the token is cancelled.
    ///
    /// The strategy moves into the signal stage; the portfolio lives in the
    /// execution stage and is returned in the report.
    pub async fn run(
        &self,
        mut strategy: Box<dyn Strategy>,
        provider: Arc<dyn MarketDataProvider>,
        symbols: &[String],
        cancel: &CancelToken,
    ) -> EngineResult<PipelineReport> {
        if symbols.is_empty() {
            return Err(EngineError::Config("no symbols given".to_string()));
        }
        let capacity = self.config.queue_capacity.max(1);

        // Subscribe before spawning anything so a bad symbol fails the run
        // up front instead of half-starting.
        let mut feeds = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let rx = provider.subscribe(symbol).await?;
            feeds.push((symbol.clone(), rx));
        }
        info!(symbols = symbols.len(), provider = provider.name(), "pipeline starting");

        let (bar_tx, mut bar_rx) = mpsc::channel::<Bar>(capacity);
        let (signal_tx, mut signal_rx) = mpsc::channel::<(Signal, Bar)>(capacity);

        let mut producers = Vec::with_capacity(feeds.len());
        for (symbol, mut rx) in feeds {
            let bar_tx = bar_tx.clone();
            let cancel = cancel.clone();
            producers.push(tokio::spawn(async move {
                while let Some(bar) = rx.recv().await {
                    if cancel.is_cancelled() {
                        debug!(symbol, "producer stopping on cancellation");
                        break;
                    }
                    send_or_block(&bar_tx, bar, "bar queue").await;
                }
            }));
        }
        drop(bar_tx);

        strategy.initialize(&BarSeries::new(""));
        let series_capacity = MIN_SERIES_CAPACITY.max(strategy.warmup_period() + 1);
        let signal_stage = tokio::spawn(async move {
            let mut series_map: HashMap<String, BarSeries> = HashMap::new();
            let mut bars_processed = 0usize;
            let mut signals_generated = 0usize;

            // Drain until the producers close the queue.
            while let Some(bar) = bar_rx.recv().await {
                bars_processed += 1;
                let series = series_map
                    .entry(bar.symbol.clone())
                    .or_insert_with(|| BarSeries::with_capacity(bar.symbol.clone(), series_capacity));
                series.push(bar.clone());

                let signal = strategy.generate_signal(series);
                if !signal.is_hold() {
                    signals_generated += 1;
                }
                send_or_block(&signal_tx, (signal, bar), "signal queue").await;
            }
            (bars_processed, signals_generated)
        });

        let config = self.config.clone();
        let execution_stage = tokio::spawn(async move {
            let mut portfolio = Portfolio::new(
                config.initial_capital,
                config.max_position_fraction,
                config.commission_rate,
            );
            let mut last_closes: HashMap<String, Decimal> = HashMap::new();
            let mut trades_executed = 0usize;

            while let Some((signal, bar)) = signal_rx.recv().await {
                if let Ok(close) = Decimal::try_from(bar.close) {
                    last_closes.insert(bar.symbol.clone(), close);
                }
                if let Some(trade) = portfolio.apply_signal(&signal, &bar) {
                    trades_executed += 1;
                    info!(
                        symbol = %trade.symbol,
                        side = %trade.side,
                        quantity = %trade.quantity,
                        price = %trade.price,
                        "trade executed"
                    );
                }
            }
            (portfolio, last_closes, trades_executed)
        });

        for producer in producers {
            producer
                .await
                .map_err(|e| EngineError::Internal(e.to_string()))?;
        }
        let (bars_processed, signals_generated) = signal_stage
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;
        let (portfolio, last_closes, trades_executed) = execution_stage
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let final_value = portfolio.equity(&last_closes);
        info!(bars_processed, signals_generated, trades_executed, "pipeline finished");

        Ok(PipelineReport {
            portfolio,
            final_value,
            bars_processed,
            signals_generated,
            trades_executed,
        })
    }
}

/// Enqueue without dropping: try first, then warn once and block.
async fn send_or_block<T>(tx: &mpsc::Sender<T>, item: T, queue: &str) {
    match tx.try_send(item) {
        Ok(()) => {}
        Err(TrySendError::Full(item)) => {
            warn!(queue, "queue full, backpressure applied");
            // Receiver gone means shutdown is already underway.
            let _ = tx.send(item).await;
        }
        Err(TrySendError::Closed(_)) => {}
    }
}
