//! Rolling price book fed by the market-data refresh task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::notifier::Notifier;
use crate::risk::PortfolioState;

use super::types::MarketSnapshot;
use super::MarketDataSource;

/// Price history samples kept per market.
pub const DEFAULT_MAX_HISTORY: usize = 500;

/// Accumulates per-market price histories across refresh cycles.
///
/// Markets that drop out of a fetch keep their accumulated history; a market
/// reappearing continues where it left off.
pub struct MarketBook {
    markets: Mutex<HashMap<String, MarketSnapshot>>,
    max_history: usize,
}

impl Default for MarketBook {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl MarketBook {
    pub fn new(max_history: usize) -> Self {
        Self {
            markets: Mutex::new(HashMap::new()),
            max_history,
        }
    }

    /// Fold a fresh fetch into the book, appending each price to its
    /// market's history.
    pub fn update(&self, fetched: Vec<MarketSnapshot>) {
        let mut markets = self.lock();
        for snapshot in fetched {
            let price = snapshot.current_price.to_f64().unwrap_or_default();
            let entry = markets
                .entry(snapshot.id.clone())
                .or_insert_with(|| MarketSnapshot {
                    price_history: Vec::new(),
                    ..snapshot.clone()
                });
            entry.title = snapshot.title;
            entry.current_price = snapshot.current_price;
            entry.price_history.push(price);
            if entry.price_history.len() > self.max_history {
                let excess = entry.price_history.len() - self.max_history;
                entry.price_history.drain(..excess);
            }
        }
    }

    /// Cloned view of every tracked market.
    pub fn snapshot(&self) -> Vec<MarketSnapshot> {
        self.lock().values().cloned().collect()
    }

    /// Latest price per market, for stop-loss sweeps.
    pub fn prices(&self) -> HashMap<String, Decimal> {
        self.lock()
            .iter()
            .map(|(id, m)| (id.clone(), m.current_price))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MarketSnapshot>> {
        self.markets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Spawn the market-data refresh loop.
///
/// Each tick fetches markets, folds them into the book, then sweeps open
/// positions against the fresh prices and notifies any stop-loss closures.
/// The task runs independently of the decision cycle and exits when the stop
/// flag flips.
pub fn spawn_refresh_task<S, N>(
    source: Arc<S>,
    book: Arc<MarketBook>,
    portfolio: Arc<PortfolioState>,
    notifier: Arc<N>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: MarketDataSource + 'static,
    N: Notifier + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match source.fetch_markets().await {
                        Ok(markets) => {
                            book.update(markets);
                            crate::metrics::record_tracked_markets(book.len());
                            let closures = portfolio.sweep_stops(&book.prices());
                            for event in closures {
                                notifier.position_closed(&event);
                            }
                        }
                        Err(e) => warn!(error = %e, "market refresh failed"),
                    }
                }
                _ = stop.changed() => {
                    if *stop.borrow() {
                        debug!("market refresh task stopping");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(id: &str, price: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            id: id.to_string(),
            title: id.to_string(),
            current_price: price,
            price_history: Vec::new(),
        }
    }

    #[test]
    fn history_accumulates_across_updates() {
        let book = MarketBook::default();
        book.update(vec![snapshot("m1", dec!(0.50))]);
        book.update(vec![snapshot("m1", dec!(0.52))]);
        book.update(vec![snapshot("m1", dec!(0.51))]);

        let markets = book.snapshot();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].price_history, vec![0.50, 0.52, 0.51]);
        assert_eq!(markets[0].current_price, dec!(0.51));
    }

    #[test]
    fn history_is_capped() {
        let book = MarketBook::new(3);
        for i in 0..5 {
            book.update(vec![snapshot("m1", Decimal::from(i))]);
        }
        let markets = book.snapshot();
        assert_eq!(markets[0].price_history, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn absent_markets_keep_their_history() {
        let book = MarketBook::default();
        book.update(vec![snapshot("m1", dec!(0.50)), snapshot("m2", dec!(0.30))]);
        book.update(vec![snapshot("m2", dec!(0.31))]);

        assert_eq!(book.len(), 2);
        let prices = book.prices();
        assert_eq!(prices["m1"], dec!(0.50));
        assert_eq!(prices["m2"], dec!(0.31));
    }
}
