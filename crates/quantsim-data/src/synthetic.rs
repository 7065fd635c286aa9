//! Deterministic synthetic market data.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use quantsim_core::error::DataError;
use quantsim_core::traits::MarketDataProvider;
use quantsim_core::types::Bar;

use crate::replay::spawn_replay;

const DAY_MS: i64 = 86_400_000;

/// Anchor timestamp for subscription streams (2024-01-01T00:00:00Z), so
/// the simulated feed is reproducible run to run.
const STREAM_ANCHOR_MS: i64 = 1_704_067_200_000;

/// Parameters for the synthetic random walk.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Base RNG seed; combined with the symbol so each instrument gets its
    /// own reproducible path
    pub seed: u64,
    /// First close of every generated series
    pub start_price: f64,
    /// Per-bar return noise amplitude
    pub volatility: f64,
    /// Per-bar deterministic drift
    pub drift: f64,
    /// Number of bars emitted by `subscribe`
    pub stream_len: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_price: 100.0,
            volatility: 0.02,
            drift: 0.0005,
            stream_len: 250,
        }
    }
}

/// Seeded random-walk data provider. Identical seed, symbol and range
/// always produce identical bars, which keeps backtests over synthetic
/// data bit-reproducible.
pub struct SyntheticProvider {
    config: SyntheticConfig,
    replay_interval: Duration,
    channel_capacity: usize,
}

impl SyntheticProvider {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            replay_interval: Duration::from_millis(100),
            channel_capacity: 64,
        }
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

    fn symbol_seed(&self, symbol: &str) -> u64 {
        // FNV-1a over the symbol bytes, mixed with the base seed.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in symbol.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100_0000_01b3);
        }
        hash ^ self.config.seed
    }

    /// Generate `count` daily bars starting at `start_ms`.
    fn generate(&self, symbol: &str, start_ms: i64, count: usize) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(self.symbol_seed(symbol));
        let mut close = self.config.start_price;
        let mut bars = Vec::with_capacity(count);

        for i in 0..count {
            let open = close;
            let ret = self.config.drift + self.config.volatility * (rng.gen::<f64>() * 2.0 - 1.0);
            close = (open * (1.0 + ret)).max(0.01);

            let high = open.max(close) * (1.0 + rng.gen::<f64>() * 0.005);
            let low = (open.min(close) * (1.0 - rng.gen::<f64>() * 0.005)).max(0.001);
            let volume = (100_000.0 + rng.gen::<f64>() * 900_000.0).round();

            bars.push(Bar::new(
                symbol,
                start_ms + i as i64 * DAY_MS,
                open,
                high,
                low,
                close,
                volume,
            ));
        }
        bars
    }
}

#[async_trait]
impl MarketDataProvider for SyntheticProvider {
    async fn fetch_historical(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let start_ms = start.timestamp_millis();
        let end_ms = end.timestamp_millis();
        if end_ms <= start_ms {
            return Err(DataError::NoDataAvailable {
                symbol: symbol.to_string(),
            });
        }

        // One bar per day over the half-open interval [start, end).
        let count = ((end_ms - start_ms + DAY_MS - 1) / DAY_MS) as usize;
        Ok(self.generate(symbol, start_ms, count))
    }

    async fn subscribe(&self, symbol: &str) -> Result<mpsc::Receiver<Bar>, DataError> {
        let bars = self.generate(symbol, STREAM_ANCHOR_MS, self.config.stream_len);
        Ok(spawn_replay(bars, self.replay_interval, self.channel_capacity))
    }

    async fn current_price(&self, symbol: &str) -> Result<f64, DataError> {
        self.generate(symbol, STREAM_ANCHOR_MS, self.config.stream_len)
            .last()
            .map(|b| b.close)
            .ok_or_else(|| DataError::NoDataAvailable {
                symbol: symbol.to_string(),
            })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(SyntheticConfig::default())
    }

    fn range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            "2024-01-01T00:00:00Z".parse().unwrap(),
            "2024-04-01T00:00:00Z".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let (start, end) = range();
        let a = provider().fetch_historical("AAPL", start, end).await.unwrap();
        let b = provider().fetch_historical("AAPL", start, end).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_symbols_get_distinct_paths() {
        let (start, end) = range();
        let provider = provider();
        let a = provider.fetch_historical("AAPL", start, end).await.unwrap();
        let b = provider.fetch_historical("MSFT", start, end).await.unwrap();
        assert_ne!(a.first().map(|x| x.close), b.first().map(|x| x.close));
    }

    #[tokio::test]
    async fn test_bars_are_valid_and_ordered() {
        let (start, end) = range();
        let bars = provider().fetch_historical("AAPL", start, end).await.unwrap();

        assert!(!bars.is_empty());
        for bar in &bars {
            bar.validate().unwrap();
        }
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[tokio::test]
    async fn test_empty_range_is_error() {
        let (start, _) = range();
        let result = provider().fetch_historical("AAPL", start, start).await;
        assert!(matches!(result, Err(DataError::NoDataAvailable { .. })));
    }
}
