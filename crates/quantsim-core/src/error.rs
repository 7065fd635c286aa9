//! Error types for the backtesting engine.

use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Strategy-specific errors.
///
/// Invalid parameters are rejected at construction time, before any bar is
/// processed. Insufficient history is never an error; strategies emit a
/// neutral `Hold` instead.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Strategy error: {0}")]
    Internal(String),
}

/// Market data errors. All of these are fatal to a run: portfolio-level
/// statistics require complete histories, so there is no partial-symbol
/// recovery and no retry.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for {symbol} in requested range")]
    NoDataAvailable { symbol: String },

    #[error("Malformed bar for {symbol} at {timestamp}: {reason}")]
    MalformedBar {
        symbol: String,
        timestamp: i64,
        reason: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Feed closed for {0}")]
    FeedClosed(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
