//! Optimize command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use quantsim_backtest::{
    BacktestConfig, OptimizeMetric, Optimizer, OptimizerConfig, ParameterGrid, RunStatus,
};
use quantsim_config::AppConfig;
use quantsim_core::traits::StrategyKind;

use crate::cli::OptimizeArgs;

use super::{cancel_on_ctrl_c, make_provider, parse_date};

pub async fn run(args: OptimizeArgs, config: &AppConfig) -> Result<()> {
    anyhow::ensure!(!args.symbols.is_empty(), "Provide at least one symbol with -S");

    let kind: StrategyKind = args
        .strategy
        .parse()
        .context("Unknown strategy; run `quantsim strategies` to list them")?;
    let grid = parse_grid(&args.grid)?;
    let metric: OptimizeMetric = args
        .metric
        .as_deref()
        .unwrap_or(&config.optimizer.metric)
        .parse()?;

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
        initial_capital: config.backtest.default_capital,
        commission_rate: config.backtest.commission_rate,
        max_position_fraction: config.backtest.max_position_fraction,
    };
    let optimizer_config = OptimizerConfig {
        workers: args.workers.unwrap_or(config.optimizer.workers),
        metric,
    };

    info!(
        strategy = %kind,
        combinations = grid.len(),
        workers = optimizer_config.workers,
        metric = metric.id(),
        "starting grid sweep"
    );
    let optimizer = Optimizer::new(backtest_config, optimizer_config);
    let report = optimizer
        .run(
            kind,
            &grid,
            provider,
            &args.symbols,
            start,
            end,
            &cancel_on_ctrl_c(),
        )
        .await?;

    println!("Grid Sweep: {} ({} combinations)", kind, report.runs.len());
    println!("═══════════════════════════════════════════════════════════");
    for run in &report.runs {
        match (&run.status, &run.result, &run.error) {
            (RunStatus::Completed, Some(result), _) => {
                println!(
                    "  #{:<3} {}  {} = {:.4}",
                    run.index,
                    run.parameters,
                    metric.id(),
                    metric.value(&result.metrics)
                );
            }
            (_, _, error) => {
                println!(
                    "  #{:<3} {}  FAILED: {}",
                    run.index,
                    run.parameters,
                    error.as_deref().unwrap_or("unknown")
                );
            }
        }
    }
    println!();

    match report.best_run() {
        Some(best) => {
            println!("Best combination: #{} {}", best.index, best.parameters);
            if let Some(result) = &best.result {
                println!("{}", result.summary());
            }
        }
        None => println!("No combination completed successfully."),
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, serde_json::to_string_pretty(&report)?)?;
        info!("Sweep report saved to {}", save_path.display());
    }

    Ok(())
}

/// Parse '{"key":[v,...],...}' into ordered grid axes.
fn parse_grid(raw: &str) -> Result<ParameterGrid> {
    let value: Value = serde_json::from_str(raw).context("Grid must be a JSON object")?;
    let object = value
        .as_object()
        .context("Grid must be a JSON object of key -> value array")?;

    let mut grid = ParameterGrid::new();
    for (key, values) in object {
        let values = values
            .as_array()
            .with_context(|| format!("Grid axis '{key}' must be an array"))?;
        anyhow::ensure!(!values.is_empty(), "Grid axis '{key}' is empty");
        grid.push(key.clone(), values.clone());
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        let grid = parse_grid("{\"short_window\":[5,10],\"long_window\":[20]}").unwrap();
        assert_eq!(grid.len(), 2);

        assert!(parse_grid("{\"short_window\":5}").is_err());
        assert!(parse_grid("{\"short_window\":[]}").is_err());
        assert!(parse_grid("[]").is_err());
    }
}
