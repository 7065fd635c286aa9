//! CSV market data provider.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use quantsim_core::error::DataError;
use quantsim_core::traits::MarketDataProvider;
use quantsim_core::types::Bar;

use crate::replay::spawn_replay;

/// CSV record format. Header names vary between data vendors, so common
/// aliases are accepted.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Historical data provider backed by a directory of `SYMBOL.csv` files.
pub struct CsvProvider {
    dir: PathBuf,
    replay_interval: Duration,
    channel_capacity: usize,
}

impl CsvProvider {
    /// Create a provider over a directory of per-symbol CSV files.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, DataError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DataError::Internal(format!(
                "not a directory: {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir,
            replay_interval: Duration::from_millis(100),
            channel_capacity: 64,
        })
    }

    /// Set the inter-bar delay used by `subscribe` replays.
    pub fn with_replay_interval(mut self, interval: Duration) -> Self {
        self.replay_interval = interval;
        self
    }

    /// Set the subscription channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Load, validate and sort all bars for a symbol.
    fn load_symbol(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let path = self.dir.join(format!("{symbol}.csv"));
        if !path.exists() {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }
        let mut bars = load_bars(&path, symbol)?;
        bars.sort_by_key(|b| b.timestamp);
        debug!(symbol, count = bars.len(), "loaded csv bars");
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for CsvProvider {
    async fn fetch_historical(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis());
        let bars: Vec<Bar> = self
            .load_symbol(symbol)?
            .into_iter()
            .filter(|b| b.timestamp >= start_ms && b.timestamp < end_ms)
            .collect();

        if bars.is_empty() {
            return Err(DataError::NoDataAvailable {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    async fn subscribe(&self, symbol: &str) -> Result<mpsc::Receiver<Bar>, DataError> {
        let bars = self.load_symbol(symbol)?;
        Ok(spawn_replay(bars, self.replay_interval, self.channel_capacity))
    }

    async fn current_price(&self, symbol: &str) -> Result<f64, DataError> {
        self.load_symbol(symbol)?
            .last()
            .map(|b| b.close)
            .ok_or_else(|| DataError::NoDataAvailable {
                symbol: symbol.to_string(),
            })
    }

    fn name(&self) -> &str {
        "csv"
    }
}

fn load_bars(path: &Path, symbol: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::Parse(e.to_string()))?;

    let mut bars = Vec::new();
    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| DataError::Parse(e.to_string()))?;
        let timestamp = parse_timestamp(&record.date)?;

        let bar = Bar::new(
            symbol,
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        // Malformed rows are rejected here, before any strategy sees them.
        bar.validate()?;
        bars.push(bar);
    }
    Ok(bars)
}

/// Parse the timestamp formats seen in vendor CSV exports.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let formats = [
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d-%m-%Y",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    // Unix timestamp, milliseconds when over 10 digits.
    if let Ok(ts) = date_str.parse::<i64>() {
        if ts > 10_000_000_000 {
            return Ok(ts);
        }
        return Ok(ts * 1000);
    }

    Err(DataError::Parse(format!("Could not parse date: {date_str}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, symbol: &str, rows: &str) {
        let mut file = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
        writeln!(file, "date,open,high,low,close,volume").unwrap();
        write!(file, "{rows}").unwrap();
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("1705312800000").is_ok()); // Unix ms
        assert!(parse_timestamp("1705312800").is_ok()); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_fetch_historical_half_open_range() {
        let dir = std::env::temp_dir().join("quantsim_csv_range_test");
        std::fs::create_dir_all(&dir).unwrap();
        write_csv(
            &dir,
            "AAPL",
            "2024-01-01,100,101,99,100.5,1000\n\
             2024-01-02,100.5,102,100,101.5,1000\n\
             2024-01-03,101.5,103,101,102.5,1000\n",
        );

        let provider = CsvProvider::new(&dir).unwrap();
        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-01-03T00:00:00Z".parse().unwrap();
        let bars = provider.fetch_historical("AAPL", start, end).await.unwrap();

        // End boundary is exclusive.
        assert_eq!(bars.len(), 2);
        assert!(bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_missing_symbol_is_typed_error() {
        let dir = std::env::temp_dir().join("quantsim_csv_missing_test");
        std::fs::create_dir_all(&dir).unwrap();

        let provider = CsvProvider::new(&dir).unwrap();
        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-02-01T00:00:00Z".parse().unwrap();
        let result = provider.fetch_historical("NOPE", start, end).await;

        assert!(matches!(result, Err(DataError::SymbolNotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_bar_rejected() {
        let dir = std::env::temp_dir().join("quantsim_csv_malformed_test");
        std::fs::create_dir_all(&dir).unwrap();
        // low above high
        write_csv(&dir, "BAD", "2024-01-01,100,99,105,100.5,1000\n");

        let provider = CsvProvider::new(&dir).unwrap();
        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-02-01T00:00:00Z".parse().unwrap();
        let result = provider.fetch_historical("BAD", start, end).await;

        assert!(matches!(result, Err(DataError::MalformedBar { .. })));
    }
}
