//! Trading signals.

use serde::{Deserialize, Serialize};

/// A strategy's recommendation for the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::Hold => write!(f, "HOLD"),
        }
    }
}

/// Output of a strategy for one bar. Created fresh per bar, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Symbol the signal applies to
    pub symbol: String,
    /// Buy, sell or hold
    pub kind: SignalKind,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Timestamp of the bar that produced the signal (Unix ms)
    pub timestamp: i64,
    /// Reference price (bar close), if the strategy had enough data
    pub price: Option<f64>,
    /// Human-readable rationale
    pub reason: Option<String>,
}

impl Signal {
    /// Create a neutral hold signal. Insufficient history is expressed this
    /// way rather than as an error.
    pub fn hold(symbol: impl Into<String>, timestamp: i64) -> Self {
        Self {
            symbol: symbol.into(),
            kind: SignalKind::Hold,
            confidence: 0.0,
            timestamp,
            price: None,
            reason: None,
        }
    }

    /// Create an actionable buy/sell signal at the given price.
    pub fn actionable(
        symbol: impl Into<String>,
        kind: SignalKind,
        confidence: f64,
        timestamp: i64,
        price: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp,
            price: Some(price),
            reason: Some(reason.into()),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.kind == SignalKind::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let signal = Signal::actionable("AAPL", SignalKind::Buy, 3.5, 1, 100.0, "test");
        assert_eq!(signal.confidence, 1.0);

        let signal = Signal::actionable("AAPL", SignalKind::Sell, -0.5, 1, 100.0, "test");
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_hold_has_no_price() {
        let signal = Signal::hold("AAPL", 42);
        assert!(signal.is_hold());
        assert_eq!(signal.price, None);
        assert_eq!(signal.confidence, 0.0);
    }
}
