//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub realtime: RealtimeSettings,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quantsim".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace/debug/info/warn/error)
    pub level: String,
    /// Output format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Backtest defaults, overridable per run on the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSettings {
    pub default_capital: Decimal,
    /// Commission as a fraction of traded notional
    pub commission_rate: Decimal,
    /// Fraction of cash targeted per new position, in (0, 1]
    pub max_position_fraction: Decimal,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            default_capital: dec!(100000),
            commission_rate: dec!(0.001),
            max_position_fraction: dec!(0.5),
        }
    }
}

/// Realtime pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeSettings {
    /// Capacity of the bar and signal queues
    pub queue_capacity: usize,
    /// Inter-bar delay of the simulated feed, in milliseconds
    pub replay_interval_ms: u64,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            replay_interval_ms: 100,
        }
    }
}

/// Grid-search optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Maximum backtests in flight at once
    pub workers: usize,
    /// Ranking metric identifier (sharpe_ratio, total_return, win_rate,
    /// max_drawdown)
    pub metric: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            metric: "sharpe_ratio".to_string(),
        }
    }
}
