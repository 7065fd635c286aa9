//! Parameter-grid optimizer.
//!
//! Runs one backtest per grid combination, fanned out on tokio tasks with a
//! semaphore bounding concurrency. Runs share nothing; results fan in over
//! a channel and are re-ordered by combination index, so the report is
//! deterministic regardless of task scheduling.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use quantsim_core::cancel::CancelToken;
use quantsim_core::error::{EngineError, EngineResult};
use quantsim_core::traits::{MarketDataProvider, StrategyKind};
use quantsim_strategies::StrategyRegistry;

use crate::engine::{BacktestConfig, BacktestEngine, BacktestResult, RunStatus};
use crate::metrics::Metrics;

/// Ordered parameter axes. The Cartesian product is emitted with the last
/// axis varying fastest, in the order axes and values were added.
#[derive(Debug, Clone, Default)]
pub struct ParameterGrid {
    axes: Vec<(String, Vec<Value>)>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis. Re-adding a key appends a second axis rather than
    /// merging; callers are expected to add each key once.
    pub fn push(&mut self, key: impl Into<String>, values: Vec<Value>) {
        self.axes.push((key.into(), values));
    }

    /// Number of combinations (1 for an empty grid: the defaults run).
    pub fn len(&self) -> usize {
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations as flat parameter mappings.
    pub fn combinations(&self) -> Vec<Map<String, Value>> {
        let mut combos = vec![Map::new()];
        for (key, values) in &self.axes {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut map = combo.clone();
                    map.insert(key.clone(), value.clone());
                    next.push(map);
                }
            }
            combos = next;
        }
        combos
    }
}

/// Metric to rank combinations by. Higher is always better; drawdown works
/// because it is non-positive, so "less negative" wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMetric {
    #[default]
    SharpeRatio,
    TotalReturn,
    WinRate,
    MaxDrawdown,
}

impl OptimizeMetric {
    pub fn value(&self, metrics: &Metrics) -> f64 {
        match self {
            OptimizeMetric::SharpeRatio => metrics.sharpe_ratio,
            OptimizeMetric::TotalReturn => metrics.total_return,
            OptimizeMetric::WinRate => metrics.win_rate,
            OptimizeMetric::MaxDrawdown => metrics.max_drawdown,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            OptimizeMetric::SharpeRatio => "sharpe_ratio",
            OptimizeMetric::TotalReturn => "total_return",
            OptimizeMetric::WinRate => "win_rate",
            OptimizeMetric::MaxDrawdown => "max_drawdown",
        }
    }
}

impl FromStr for OptimizeMetric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharpe_ratio" | "sharpe" => Ok(OptimizeMetric::SharpeRatio),
            "total_return" => Ok(OptimizeMetric::TotalReturn),
            "win_rate" => Ok(OptimizeMetric::WinRate),
            "max_drawdown" => Ok(OptimizeMetric::MaxDrawdown),
            other => Err(EngineError::Config(format!("unknown metric: {other}"))),
        }
    }
}

/// Optimizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Maximum backtests in flight at once
    pub workers: usize,
    /// Ranking metric
    pub metric: OptimizeMetric,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            metric: OptimizeMetric::default(),
        }
    }
}

/// Outcome of one grid combination. Failures keep their error string so a
/// partially failed sweep still reports which combinations were tried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerRun {
    /// Position in the grid's combination order
    pub index: usize,
    /// Parameters this combination ran with
    pub parameters: Value,
    pub status: RunStatus,
    /// Present when the run completed
    pub result: Option<BacktestResult>,
    /// Present when the run failed
    pub error: Option<String>,
}

/// Full sweep outcome, in combination order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub runs: Vec<OptimizerRun>,
    /// Index into `runs` of the best completed run, if any completed.
    /// Ties keep the first-seen combination.
    pub best: Option<usize>,
    /// Metric the ranking used
    pub metric: OptimizeMetric,
}

impl OptimizeReport {
    pub fn best_run(&self) -> Option<&OptimizerRun> {
        self.best.and_then(|i| self.runs.get(i))
    }
}

/// Grid-search optimizer over the backtest engine.
pub struct Optimizer {
    backtest: BacktestConfig,
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(backtest: BacktestConfig, config: OptimizerConfig) -> Self {
        Self { backtest, config }
    }

    /// Sweep the grid for one strategy kind over a shared data range.
    ///
    /// Individual run failures (bad parameter combinations, for instance)
    /// are recorded, not fatal; only an empty grid is an error.
    pub async fn run(
        &self,
        kind: StrategyKind,
        grid: &ParameterGrid,
        provider: Arc<dyn MarketDataProvider>,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> EngineResult<OptimizeReport> {
        let combos = grid.combinations();
        if combos.is_empty() {
            return Err(EngineError::Config("parameter grid is empty".to_string()));
        }
        let total = combos.len();
        debug!(total, workers = self.config.workers, "starting grid sweep");

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let (tx, mut rx) = mpsc::channel::<OptimizerRun>(total);

        for (index, combo) in combos.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            let provider = provider.clone();
            let symbols = symbols.to_vec();
            let cancel = cancel.clone();
            let backtest = self.backtest.clone();

            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let parameters = Value::Object(combo);
                let run = match run_one(
                    kind,
                    parameters.clone(),
                    backtest,
                    provider,
                    &symbols,
                    start,
                    end,
                    &cancel,
                )
                .await
                {
                    Ok(result) => OptimizerRun {
                        index,
                        parameters,
                        status: RunStatus::Completed,
                        result: Some(result),
                        error: None,
                    },
                    Err(e) => {
                        warn!(index, error = %e, "grid combination failed");
                        OptimizerRun {
                            index,
                            parameters,
                            status: RunStatus::Failed,
                            result: None,
                            error: Some(e.to_string()),
                        }
                    }
                };
                let _ = tx.send(run).await;
            });
        }
        drop(tx);

        let mut runs = Vec::with_capacity(total);
        while let Some(run) = rx.recv().await {
            runs.push(run);
        }
        runs.sort_by_key(|r| r.index);

        let mut best: Option<usize> = None;
        let mut best_score = f64::NEG_INFINITY;
        for (i, run) in runs.iter().enumerate() {
            if let Some(result) = &run.result {
                let score = self.config.metric.value(&result.metrics);
                if best.is_none() || score > best_score {
                    best = Some(i);
                    best_score = score;
                }
            }
        }

        Ok(OptimizeReport {
            runs,
            best,
            metric: self.config.metric,
        })
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_one(
    kind: StrategyKind,
    parameters: Value,
    backtest: BacktestConfig,
    provider: Arc<dyn MarketDataProvider>,
    symbols: &[String],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    cancel: &CancelToken,
) -> EngineResult<BacktestResult> {
    let mut strategy = StrategyRegistry::new().create(kind, parameters)?;
    BacktestEngine::new(backtest)
        .run(strategy.as_mut(), provider.as_ref(), symbols, start, end, cancel)
        .await
}
