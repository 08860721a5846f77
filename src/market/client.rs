//! Kalshi trade API client wrapper.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::MarketError;

use super::types::{MarketSnapshot, MarketsResponse};
use super::MarketDataSource;

/// Thin HTTP client for the Kalshi trade API.
#[derive(Debug, Clone)]
pub struct KalshiClient {
    http: reqwest::Client,
    base_url: String,
    /// Maximum markets per listing request.
    page_limit: usize,
}

impl KalshiClient {
    /// Create a client from config with pooled connections.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(std::time::Duration::from_millis(500))
            .tcp_nodelay(true)
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: config.kalshi_base_url.trim_end_matches('/').to_string(),
            page_limit: 100,
        }
    }

    /// Fetch open markets, following pagination cursors.
    #[instrument(skip(self))]
    pub async fn get_open_markets(&self) -> Result<Vec<MarketSnapshot>, MarketError> {
        let mut snapshots = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/trade-api/v2/markets?status=open&limit={}",
                self.base_url, self.page_limit
            );
            if let Some(c) = &cursor {
                url.push_str("&cursor=");
                url.push_str(c);
            }

            let response = self.http.get(&url).send().await?.error_for_status()?;
            let page: MarketsResponse = response
                .json()
                .await
                .map_err(|e| MarketError::ParseError(e.to_string()))?;

            for market in &page.markets {
                let Some(cents) = market.last_price else {
                    debug!(ticker = %market.ticker, "market has no last price, skipping");
                    continue;
                };
                snapshots.push(MarketSnapshot {
                    id: market.ticker.clone(),
                    title: market.title.clone(),
                    current_price: Decimal::from(cents) / dec!(100),
                    price_history: Vec::new(),
                });
            }

            match page.cursor {
                Some(c) if !c.is_empty() => cursor = Some(c),
                _ => break,
            }
        }

        if snapshots.is_empty() {
            warn!("no open markets returned");
            return Err(MarketError::NoMarkets);
        }
        debug!(count = snapshots.len(), "fetched open markets");
        Ok(snapshots)
    }
}

impl MarketDataSource for KalshiClient {
    async fn fetch_markets(&self) -> Result<Vec<MarketSnapshot>, MarketError> {
        self.get_open_markets().await
    }
}
