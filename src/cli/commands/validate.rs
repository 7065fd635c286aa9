//! Validate configuration command.

use anyhow::{Context, Result};
use quantsim_config::load_config;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.context("Provide a configuration file with --config")?;
    println!("Validating configuration: {}", path.display());

    match load_config(Some(path)) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Default capital: {}", config.backtest.default_capital);
            println!("Commission rate: {}", config.backtest.commission_rate);
            println!("Position fraction: {}", config.backtest.max_position_fraction);
            println!("Queue capacity: {}", config.realtime.queue_capacity);
            println!("Optimizer workers: {}", config.optimizer.workers);
            println!("Optimizer metric: {}", config.optimizer.metric);
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {e}");
            Err(e.into())
        }
    }
}
