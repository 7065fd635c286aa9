//! Position types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// An open or closed holding of a symbol.
///
/// Owned exclusively by the portfolio that created it: opened by a `buy`
/// signal when no open position exists for the symbol, transitioned to
/// closed by a matching `sell`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol held
    pub symbol: String,
    /// Number of shares, always positive (long only)
    pub quantity: Decimal,
    /// Entry price per share
    pub entry_price: Decimal,
    /// Entry timestamp (Unix ms)
    pub entry_time: i64,
    /// Exit price per share, set on close
    pub exit_price: Option<Decimal>,
    /// Exit timestamp, set on close
    pub exit_time: Option<i64>,
    /// Realized profit/loss net of commission, set on close
    pub realized_pnl: Option<Decimal>,
    /// Open or closed
    pub status: PositionStatus,
}

impl Position {
    /// Open a new position.
    pub fn open(
        symbol: impl Into<String>,
        quantity: Decimal,
        entry_price: Decimal,
        entry_time: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
            entry_time,
            exit_price: None,
            exit_time: None,
            realized_pnl: None,
            status: PositionStatus::Open,
        }
    }

    /// Transition to closed, recording exit price, time and realized P&L.
    pub fn close(&mut self, exit_price: Decimal, exit_time: i64, realized_pnl: Decimal) {
        self.exit_price = Some(exit_price);
        self.exit_time = Some(exit_time);
        self.realized_pnl = Some(realized_pnl);
        self.status = PositionStatus::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Cost basis at entry (quantity x entry price).
    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.entry_price
    }

    /// Market value at the given price.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.quantity * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_position_lifecycle() {
        let mut position = Position::open("AAPL", dec!(10), dec!(150.00), 1);
        assert!(position.is_open());
        assert_eq!(position.cost_basis(), dec!(1500.00));
        assert_eq!(position.market_value(dec!(160.00)), dec!(1600.00));

        position.close(dec!(160.00), 2, dec!(100.00));
        assert!(!position.is_open());
        assert_eq!(position.exit_price, Some(dec!(160.00)));
        assert_eq!(position.realized_pnl, Some(dec!(100.00)));
    }
}
