//! Market data provider trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::error::DataError;
use crate::types::Bar;

/// Abstract source of market data. Implementations (CSV directories, the
/// synthetic generator) are pluggable; the engine depends only on this
/// contract.
///
/// Ordering guarantees hold per symbol only. Cross-symbol ordering is the
/// engine's responsibility.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch historical bars for the half-open interval `[start, end)`,
    /// ascending by timestamp, validated.
    ///
    /// A failure here is fatal to the consuming run: portfolio statistics
    /// require complete histories, so there is no partial-symbol recovery.
    async fn fetch_historical(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError>;

    /// Subscribe to a live (or simulated-live) bar stream for a symbol.
    ///
    /// Bars arrive in order on a bounded channel until the sender is
    /// dropped. Simulation replays historical bars with a fixed inter-bar
    /// delay.
    async fn subscribe(&self, symbol: &str) -> Result<mpsc::Receiver<Bar>, DataError>;

    /// Latest known price for a symbol.
    async fn current_price(&self, symbol: &str) -> Result<f64, DataError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
