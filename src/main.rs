//! quantsim CLI application.

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use logging::setup_logging;
use quantsim_config::AppConfig;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_str(), cli.json_logs);

    match cli.command {
        Commands::Backtest(args) => {
            let config = load(cli.config.as_deref())?;
            cli::commands::backtest::run(args, &config).await
        }
        Commands::Optimize(args) => {
            let config = load(cli.config.as_deref())?;
            cli::commands::optimize::run(args, &config).await
        }
        Commands::Stream(args) => {
            let config = load(cli.config.as_deref())?;
            cli::commands::stream::run(args, &config).await
        }
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(cli.config.as_deref()).await,
    }
}

fn load(path: Option<&Path>) -> Result<AppConfig> {
    Ok(quantsim_config::load_config(path)?)
}
