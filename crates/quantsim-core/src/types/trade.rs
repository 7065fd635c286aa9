//! Executed trade ledger entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Immutable ledger entry recording an executed buy or sell.
///
/// The trade list is append-only and is the sole source for metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Buy or sell
    pub side: Side,
    /// Symbol traded
    pub symbol: String,
    /// Number of shares
    pub quantity: Decimal,
    /// Execution price per share
    pub price: Decimal,
    /// Commission charged
    pub commission: Decimal,
    /// Execution timestamp (Unix ms)
    pub timestamp: i64,
    /// Realized profit/loss; populated for sells only
    pub pnl: Option<Decimal>,
}

impl Trade {
    /// Notional value of the trade (price x quantity, before commission).
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}
