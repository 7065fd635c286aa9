//! CLI command implementations.

pub mod backtest;
pub mod optimize;
pub mod strategies;
pub mod stream;
pub mod validate;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use quantsim_core::cancel::CancelToken;
use quantsim_core::traits::MarketDataProvider;
use quantsim_data::{CsvProvider, SyntheticConfig, SyntheticProvider};

/// CSV directory when given, the seeded synthetic generator otherwise.
pub(crate) fn make_provider(
    data: Option<&Path>,
    seed: u64,
    replay_interval: Duration,
    channel_capacity: usize,
) -> Result<Arc<dyn MarketDataProvider>> {
    match data {
        Some(dir) => {
            let provider = CsvProvider::new(dir)
                .with_context(|| format!("Failed to open data directory {}", dir.display()))?
                .with_replay_interval(replay_interval)
                .with_channel_capacity(channel_capacity);
            Ok(Arc::new(provider))
        }
        None => {
            let provider = SyntheticProvider::new(SyntheticConfig {
                seed,
                ..SyntheticConfig::default()
            })
            .with_replay_interval(replay_interval)
            .with_channel_capacity(channel_capacity);
            Ok(Arc::new(provider))
        }
    }
}

/// Parse a YYYY-MM-DD date as midnight UTC.
pub(crate) fn parse_date(date: &str) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date '{date}'"))?;
    Ok(midnight.and_utc())
}

/// Parse an optional JSON parameter object; absent means defaults.
pub(crate) fn parse_params(params: Option<&str>) -> Result<Value> {
    match params {
        Some(raw) => {
            let value: Value =
                serde_json::from_str(raw).context("Parameters must be a JSON object")?;
            anyhow::ensure!(value.is_object(), "Parameters must be a JSON object");
            Ok(value)
        }
        None => Ok(Value::Object(Default::default())),
    }
}

/// Token that trips on Ctrl-C.
pub(crate) fn cancel_on_ctrl_c() -> CancelToken {
    let cancel = CancelToken::default();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            token.cancel();
        }
    });
    cancel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let dt = parse_date("2024-03-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(parse_date("03/01/2024").is_err());
    }

    #[test]
    fn test_parse_params() {
        assert!(parse_params(None).unwrap().is_object());
        assert!(parse_params(Some("{\"short_window\":5}")).is_ok());
        assert!(parse_params(Some("[1,2]")).is_err());
        assert!(parse_params(Some("not json")).is_err());
    }
}
