//! Unified error types for the trading bot.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the trading bot.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Runtime settings error.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Market-data error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Trading/position error.
    #[error("trading error: {0}")]
    Trading(#[from] TradingError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market-data fetch and parse errors.
#[derive(Error, Debug)]
pub enum MarketError {
    /// The exchange returned no tradeable markets.
    #[error("no open markets returned by exchange")]
    NoMarkets,

    /// Failed to fetch market data.
    #[error("failed to fetch markets: {reason}")]
    FetchFailed {
        /// Reason for failure.
        reason: String,
    },

    /// Failed to parse market data.
    #[error("failed to parse market data: {0}")]
    ParseError(String),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Trading and position-book errors.
#[derive(Error, Debug)]
pub enum TradingError {
    /// Position value exceeds the configured bankroll cap.
    /// Execution declines the trade; callers log a warning, never panic.
    #[error("risk limit exceeded: position value {position_value} > max {max_allowed}")]
    RiskLimitExceeded {
        /// Dollar value of the proposed position.
        position_value: Decimal,
        /// Maximum allowed value under the current bankroll.
        max_allowed: Decimal,
    },

    /// A position is already open in this market.
    #[error("position already open in market {market_id}")]
    PositionExists {
        /// Market with the existing position.
        market_id: String,
    },

    /// No open position to close in this market.
    #[error("no open position in market {market_id}")]
    UnknownPosition {
        /// Market without a position.
        market_id: String,
    },

    /// Order quantity computed to zero or negative.
    #[error("invalid order quantity: {0}")]
    InvalidQuantity(i64),
}

/// Runtime settings validation and persistence errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A field failed its range check. The update is rejected wholesale.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// Settings file could not be read or written.
    #[error("settings persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Settings file could not be parsed.
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Structured failure reason carried inside statistical result structs.
///
/// Statistical routines are total functions: they never raise past their own
/// boundary. A failed fit or test returns a neutral/zeroed result with one of
/// these attached instead of an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatFailure {
    /// Routine invoked below its minimum sample-size requirement.
    #[error("insufficient data: need {required} points, have {actual}")]
    InsufficientData {
        /// Minimum required sample size.
        required: usize,
        /// Actual sample size supplied.
        actual: usize,
    },

    /// Model fit or test failure (non-convergence, singular matrix,
    /// zero variance, non-positive prices).
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_failure_display() {
        let f = StatFailure::InsufficientData {
            required: 50,
            actual: 10,
        };
        assert_eq!(f.to_string(), "insufficient data: need 50 points, have 10");

        let f = StatFailure::Numerical("singular regression".to_string());
        assert_eq!(f.to_string(), "numerical failure: singular regression");
    }

    #[test]
    fn trading_error_display() {
        let e = TradingError::PositionExists {
            market_id: "FED-24DEC".to_string(),
        };
        assert!(e.to_string().contains("FED-24DEC"));
    }
}
