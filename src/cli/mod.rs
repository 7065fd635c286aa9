//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quantsim")]
#[command(author, version, about = "Deterministic strategy backtesting and signal simulation")]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest over historical data
    Backtest(BacktestArgs),
    /// Grid-search strategy parameters
    Optimize(OptimizeArgs),
    /// Run the simulated-live signal pipeline
    Stream(StreamArgs),
    /// List available strategies
    Strategies,
    /// Validate a configuration file
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Strategy to backtest (ma_crossover, mean_reversion, momentum)
    #[arg(short, long)]
    pub strategy: String,

    /// Symbols to trade (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Start date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub start: String,

    /// End date (YYYY-MM-DD), exclusive
    #[arg(long)]
    pub end: String,

    /// Initial capital (falls back to config)
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Strategy parameters as a JSON object
    #[arg(short, long)]
    pub params: Option<String>,

    /// Directory of SYMBOL.csv files; omit to use the synthetic generator
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Seed for the synthetic generator
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,

    /// Save results to file (JSON)
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct OptimizeArgs {
    /// Strategy to optimize
    #[arg(short, long)]
    pub strategy: String,

    /// Symbols to trade (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Start date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub start: String,

    /// End date (YYYY-MM-DD), exclusive
    #[arg(long)]
    pub end: String,

    /// Parameter grid as a JSON object of key -> value array,
    /// e.g. '{"short_window":[5,10],"long_window":[20,30]}'
    #[arg(short, long)]
    pub grid: String,

    /// Concurrent backtests (falls back to config)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Ranking metric (sharpe_ratio, total_return, win_rate, max_drawdown)
    #[arg(long)]
    pub metric: Option<String>,

    /// Directory of SYMBOL.csv files; omit to use the synthetic generator
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Seed for the synthetic generator
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Save the full sweep report to file (JSON)
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct StreamArgs {
    /// Strategy to run
    #[arg(short, long)]
    pub strategy: String,

    /// Symbols to stream (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Strategy parameters as a JSON object
    #[arg(short, long)]
    pub params: Option<String>,

    /// Initial capital (falls back to config)
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Directory of SYMBOL.csv files; omit to use the synthetic generator
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Seed for the synthetic generator
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Inter-bar replay delay in milliseconds (falls back to config)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}
