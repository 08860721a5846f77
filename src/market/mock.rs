//! In-memory market source for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::MarketError;

use super::types::MarketSnapshot;
use super::MarketDataSource;

/// Market source backed by a mutable in-memory list.
#[derive(Debug, Default)]
pub struct MockMarketSource {
    markets: Mutex<Vec<MarketSnapshot>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockMarketSource {
    pub fn new(markets: Vec<MarketSnapshot>) -> Self {
        Self {
            markets: Mutex::new(markets),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the returned market set.
    pub fn set_markets(&self, markets: Vec<MarketSnapshot>) {
        *self.markets.lock().unwrap_or_else(|e| e.into_inner()) = markets;
    }

    /// Make subsequent fetches fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetches served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataSource for MockMarketSource {
    async fn fetch_markets(&self) -> Result<Vec<MarketSnapshot>, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MarketError::FetchFailed {
                reason: "mock failure".to_string(),
            });
        }
        Ok(self.markets.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
