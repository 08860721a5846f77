//! Market data: Kalshi API client, rolling price book, mock source.

pub mod book;
pub mod client;
pub mod mock;
pub mod types;

pub use book::{spawn_refresh_task, MarketBook, DEFAULT_MAX_HISTORY};
pub use client::KalshiClient;
pub use mock::MockMarketSource;
pub use types::MarketSnapshot;

use crate::error::MarketError;

/// Anything that can produce the current set of tradable markets.
///
/// Implemented by the live Kalshi client and by the in-memory mock used in
/// tests. Consumers are generic over the source rather than boxing it.
pub trait MarketDataSource: Send + Sync {
    fn fetch_markets(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<MarketSnapshot>, MarketError>> + Send;
}
