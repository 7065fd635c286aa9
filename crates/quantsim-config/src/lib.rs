//! Configuration management.
//!
//! Defaults < TOML file < `QUANTSIM__`-prefixed environment variables.

mod settings;

pub use settings::{
    AppConfig, AppSettings, BacktestSettings, LoggingConfig, OptimizerSettings, RealtimeSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration, optionally layering a TOML file over the defaults.
/// Environment variables like `QUANTSIM__BACKTEST__DEFAULT_CAPITAL` win over
/// both.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let config = builder
        .add_source(
            Environment::with_prefix("QUANTSIM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Missing sections fall back to their serde defaults.
    config.try_deserialize()
}
