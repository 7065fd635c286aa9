//! Stream command: the simulated-live signal pipeline.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use quantsim_config::AppConfig;
use quantsim_core::traits::StrategyKind;
use quantsim_realtime::{PipelineConfig, RealtimePipeline};
use quantsim_strategies::StrategyRegistry;

use crate::cli::StreamArgs;

use super::{cancel_on_ctrl_c, make_provider, parse_params};

pub async fn run(args: StreamArgs, config: &AppConfig) -> Result<()> {
    anyhow::ensure!(!args.symbols.is_empty(), "Provide at least one symbol with -S");

    let kind: StrategyKind = args
        .strategy
        .parse()
        .context("Unknown strategy; run `quantsim strategies` to list them")?;
    let params = parse_params(args.params.as_deref())?;
    let strategy = StrategyRegistry::new()
        .create(kind, params)
        .context("Failed to create strategy")?;

    let interval = Duration::from_millis(
        args.interval_ms.unwrap_or(config.realtime.replay_interval_ms),
    );
    let provider = make_provider(
        args.data.as_deref(),
        args.seed,
        interval,
        config.realtime.queue_capacity,
    )?;

    let pipeline_config = PipelineConfig {
        queue_capacity: config.realtime.queue_capacity,
        initial_capital: args.capital.unwrap_or(config.backtest.default_capital),
        commission_rate: config.backtest.commission_rate,
        max_position_fraction: config.backtest.max_position_fraction,
    };

    info!(strategy = %kind, symbols = args.symbols.len(), "starting stream (Ctrl-C to stop)");
    let pipeline = RealtimePipeline::new(pipeline_config);
    let report = pipeline
        .run(strategy, provider, &args.symbols, &cancel_on_ctrl_c())
        .await?;

    println!("Stream Summary");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Bars Processed:      {}", report.bars_processed);
    println!("  Signals Generated:   {}", report.signals_generated);
    println!("  Trades Executed:     {}", report.trades_executed);
    println!("  Final Cash:          ${:.2}", report.portfolio.cash);
    println!("  Final Value:         ${:.2}", report.final_value);
    println!("  Open Positions:      {}", report.portfolio.positions.len());

    Ok(())
}
