//! Portfolio state and trade execution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{Bar, Position, Side, Signal, SignalKind, Trade};

/// Cash, open positions and the append-only trade ledger.
///
/// Invariants upheld by [`Portfolio::apply_signal`]:
/// - cash never goes negative: a buy that cannot be paid for is absorbed as
///   a no-op, not an error
/// - at most one open position per symbol; a buy while holding and a sell
///   while flat are both no-ops
/// - mutation happens one signal at a time, in bar-timestamp order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    /// Available cash
    pub cash: Decimal,
    /// Symbol -> open position (at most one per symbol). Ordered map so
    /// serialized portfolios are byte-stable across runs.
    pub positions: BTreeMap<String, Position>,
    /// Positions that have been closed, in close order
    pub closed_positions: Vec<Position>,
    /// Executed trades, append-only
    pub trades: Vec<Trade>,
    /// Fraction of cash targeted per new position, in (0, 1]
    pub max_position_fraction: Decimal,
    /// Commission as a fraction of notional
    pub commission_rate: Decimal,
}

impl Portfolio {
    /// Create a portfolio with initial cash and execution parameters.
    pub fn new(cash: Decimal, max_position_fraction: Decimal, commission_rate: Decimal) -> Self {
        Self {
            cash,
            positions: BTreeMap::new(),
            closed_positions: Vec::new(),
            trades: Vec::new(),
            max_position_fraction,
            commission_rate,
        }
    }

    /// Check if there is an open position for a symbol.
    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Apply one signal at the bar's close price, returning the executed
    /// trade if one occurred.
    ///
    /// Hold never mutates state. Unexecutable buys and sells (already
    /// holding, nothing to sell, insufficient cash, zero quantity) are
    /// silently absorbed: thin-data and low-cash periods are expected.
    pub fn apply_signal(&mut self, signal: &Signal, bar: &Bar) -> Option<Trade> {
        match signal.kind {
            SignalKind::Hold => None,
            SignalKind::Buy => self.execute_buy(bar),
            SignalKind::Sell => self.execute_sell(bar),
        }
    }

    fn execute_buy(&mut self, bar: &Bar) -> Option<Trade> {
        if self.has_position(&bar.symbol) {
            debug!(symbol = %bar.symbol, "buy skipped: position already open");
            return None;
        }

        let price = Decimal::try_from(bar.close).ok()?;
        if price <= Decimal::ZERO {
            return None;
        }

        let target = self.cash * self.max_position_fraction;
        let quantity = (target / price).floor();
        if quantity <= Decimal::ZERO {
            debug!(symbol = %bar.symbol, "buy skipped: sized to zero quantity");
            return None;
        }

        let notional = price * quantity;
        let commission = notional * self.commission_rate;
        let cost = notional + commission;
        if cost > self.cash {
            debug!(symbol = %bar.symbol, %cost, cash = %self.cash, "buy skipped: insufficient cash");
            return None;
        }

        self.cash -= cost;
        self.positions.insert(
            bar.symbol.clone(),
            Position::open(&bar.symbol, quantity, price, bar.timestamp),
        );

        let trade = Trade {
            side: Side::Buy,
            symbol: bar.symbol.clone(),
            quantity,
            price,
            commission,
            timestamp: bar.timestamp,
            pnl: None,
        };
        self.trades.push(trade.clone());
        Some(trade)
    }

    fn execute_sell(&mut self, bar: &Bar) -> Option<Trade> {
        if !self.has_position(&bar.symbol) {
            debug!(symbol = %bar.symbol, "sell skipped: no open position");
            return None;
        }

        let price = Decimal::try_from(bar.close).ok()?;
        // Entry checked above; remove only once the price is usable.
        let mut position = self.positions.remove(&bar.symbol)?;

        let proceeds = price * position.quantity;
        let commission = proceeds * self.commission_rate;
        let pnl = proceeds - commission - position.cost_basis();

        self.cash += proceeds - commission;
        position.close(price, bar.timestamp, pnl);

        let trade = Trade {
            side: Side::Sell,
            symbol: bar.symbol.clone(),
            quantity: position.quantity,
            price,
            commission,
            timestamp: bar.timestamp,
            pnl: Some(pnl),
        };
        self.closed_positions.push(position);
        self.trades.push(trade.clone());
        Some(trade)
    }

    /// Total portfolio value: cash plus open positions marked at the most
    /// recent known close per symbol. Symbols missing from the map fall
    /// back to their entry price.
    pub fn equity(&self, last_closes: &HashMap<String, Decimal>) -> Decimal {
        let positions_value: Decimal = self
            .positions
            .values()
            .map(|p| {
                let price = last_closes.get(&p.symbol).copied().unwrap_or(p.entry_price);
                p.market_value(price)
            })
            .sum();
        self.cash + positions_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionStatus;
    use rust_decimal_macros::dec;

    fn bar(symbol: &str, ts: i64, close: f64) -> Bar {
        Bar::new(symbol, ts, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    fn buy(symbol: &str, ts: i64) -> Signal {
        Signal::actionable(symbol, SignalKind::Buy, 0.8, ts, 0.0, "test buy")
    }

    fn sell(symbol: &str, ts: i64) -> Signal {
        Signal::actionable(symbol, SignalKind::Sell, 0.8, ts, 0.0, "test sell")
    }

    #[test]
    fn test_buy_sizing() {
        // cash 1000, commission 0, fraction 1.0, price 100 -> qty 10, cash 0
        let mut portfolio = Portfolio::new(dec!(1000), dec!(1.0), Decimal::ZERO);
        let trade = portfolio
            .apply_signal(&buy("AAPL", 1), &bar("AAPL", 1, 100.0))
            .unwrap();

        assert_eq!(trade.quantity, dec!(10));
        assert_eq!(portfolio.cash, Decimal::ZERO);

        let position = portfolio.positions.get("AAPL").unwrap();
        assert_eq!(position.quantity, dec!(10));
        assert_eq!(position.entry_price, dec!(100));
        assert!(position.is_open());
    }

    #[test]
    fn test_buy_rejected_when_commission_unaffordable() {
        // qty floors to 10 but commission pushes cost above cash
        let mut portfolio = Portfolio::new(dec!(1000), dec!(1.0), dec!(0.01));
        let trade = portfolio.apply_signal(&buy("AAPL", 1), &bar("AAPL", 1, 100.0));
        assert!(trade.is_none());
        assert_eq!(portfolio.cash, dec!(1000));
        assert!(portfolio.trades.is_empty());
    }

    #[test]
    fn test_no_pyramiding() {
        let mut portfolio = Portfolio::new(dec!(10000), dec!(0.5), Decimal::ZERO);
        assert!(portfolio
            .apply_signal(&buy("AAPL", 1), &bar("AAPL", 1, 100.0))
            .is_some());
        // Second buy for the same symbol is absorbed.
        assert!(portfolio
            .apply_signal(&buy("AAPL", 2), &bar("AAPL", 2, 90.0))
            .is_none());
        assert_eq!(portfolio.trades.len(), 1);
    }

    #[test]
    fn test_sell_without_position_is_noop() {
        let mut portfolio = Portfolio::new(dec!(1000), dec!(1.0), Decimal::ZERO);
        assert!(portfolio
            .apply_signal(&sell("AAPL", 1), &bar("AAPL", 1, 100.0))
            .is_none());
        assert!(portfolio.trades.is_empty());
    }

    #[test]
    fn test_round_trip_pnl() {
        let mut portfolio = Portfolio::new(dec!(1000), dec!(1.0), Decimal::ZERO);
        portfolio.apply_signal(&buy("AAPL", 1), &bar("AAPL", 1, 100.0));
        let trade = portfolio
            .apply_signal(&sell("AAPL", 2), &bar("AAPL", 2, 110.0))
            .unwrap();

        // 10 shares, +10 each
        assert_eq!(trade.pnl, Some(dec!(100)));
        assert_eq!(portfolio.cash, dec!(1100));
        assert!(portfolio.positions.is_empty());
        assert_eq!(portfolio.closed_positions.len(), 1);
        assert_eq!(
            portfolio.closed_positions[0].status,
            PositionStatus::Closed
        );
    }

    #[test]
    fn test_cash_never_negative() {
        let mut portfolio = Portfolio::new(dec!(50), dec!(1.0), dec!(0.001));
        for ts in 0..20 {
            let symbol = if ts % 2 == 0 { "AAPL" } else { "MSFT" };
            portfolio.apply_signal(&buy(symbol, ts), &bar(symbol, ts, 7.0));
            portfolio.apply_signal(&sell(symbol, ts), &bar(symbol, ts, 6.0));
            assert!(portfolio.cash >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_serialization_is_order_stable() {
        // Same holdings inserted in opposite orders serialize identically.
        let aapl = Position::open("AAPL", dec!(25), dec!(100), 1);
        let msft = Position::open("MSFT", dec!(50), dec!(50), 2);

        let mut first = Portfolio::new(dec!(5000), dec!(0.25), Decimal::ZERO);
        first.positions.insert("AAPL".to_string(), aapl.clone());
        first.positions.insert("MSFT".to_string(), msft.clone());

        let mut second = Portfolio::new(dec!(5000), dec!(0.25), Decimal::ZERO);
        second.positions.insert("MSFT".to_string(), msft);
        second.positions.insert("AAPL".to_string(), aapl);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_equity_uses_last_close() {
        let mut portfolio = Portfolio::new(dec!(1000), dec!(1.0), Decimal::ZERO);
        portfolio.apply_signal(&buy("AAPL", 1), &bar("AAPL", 1, 100.0));

        let mut closes = HashMap::new();
        closes.insert("AAPL".to_string(), dec!(120));
        assert_eq!(portfolio.equity(&closes), dec!(1200));

        // Missing symbol falls back to entry price.
        assert_eq!(portfolio.equity(&HashMap::new()), dec!(1000));
    }
}
