//! Backtest command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use quantsim_backtest::{BacktestConfig, BacktestEngine};
use quantsim_config::AppConfig;
use quantsim_core::traits::StrategyKind;
use quantsim_strategies::StrategyRegistry;

use crate::cli::BacktestArgs;

use super::{cancel_on_ctrl_c, make_provider, parse_date, parse_params};

pub async fn run(args: BacktestArgs, config: &AppConfig) -> Result<()> {
    anyhow::ensure!(!args.symbols.is_empty(), "Provide at least one symbol with -S");

    let kind: StrategyKind = args
        .strategy
        .parse()
        .context("Unknown strategy; run `quantsim strategies` to list them")?;
    let params = parse_params(args.params.as_deref())?;
    let mut strategy = StrategyRegistry::new()
        .create(kind, params)
        .context("Failed to create strategy")?;

    let provider = make_provider(
        args.data.as_deref(),
        args.seed,
        Duration::from_millis(config.realtime.replay_interval_ms),
        config.realtime.queue_capacity,
    )?;
    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;
    anyhow::ensure!(start < end, "Start date must be before end date");

    let backtest_config = BacktestConfig {
        initial_capital: args.capital.unwrap_or(config.backtest.default_capital),
        commission_rate: config.backtest.commission_rate,
        max_position_fraction: config.backtest.max_position_fraction,
    };

    info!(
        strategy = %kind,
        symbols = args.symbols.len(),
        provider = provider.name(),
        "starting backtest"
    );
    let engine = BacktestEngine::new(backtest_config);
    let result = engine
        .run(
            strategy.as_mut(),
            provider.as_ref(),
            &args.symbols,
            start,
            end,
            &cancel_on_ctrl_c(),
        )
        .await?;

    match args.output.as_str() {
        "json" => println!("{}", result.to_json()?),
        _ => println!("{}", result.summary()),
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, result.to_json()?)?;
        info!("Results saved to {}", save_path.display());
    }

    Ok(())
}
