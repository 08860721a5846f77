//! Market data structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tracked event market with its accumulated price history.
///
/// `current_price` is exact money in dollars; `price_history` feeds the
/// statistical engines, which work in floating point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Market ticker, e.g. "FED-25MAR-HIKE".
    pub id: String,
    /// Human-readable market title.
    pub title: String,
    /// Last traded price in dollars.
    pub current_price: Decimal,
    /// Ordered price history, oldest first.
    pub price_history: Vec<f64>,
}

/// Raw market record from the Kalshi trade API.
///
/// Prices arrive in cents.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMarket {
    pub ticker: String,
    pub title: String,
    pub last_price: Option<i64>,
    pub status: Option<String>,
}

/// Envelope for the markets listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<ApiMarket>,
    pub cursor: Option<String>,
}
