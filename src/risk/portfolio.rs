//! Shared position book and bankroll with stop-loss enforcement.

use std::collections::HashMap;
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::Serialize;
use strum::Display;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::TradingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

/// An open position with its precomputed stop price.
#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub market_id: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub quantity: i64,
    pub stop_price: Decimal,
    /// Strategy that opened the position, e.g. "news_sentiment".
    pub strategy: String,
    #[serde(with = "time::serde::rfc3339")]
    pub opened_at: OffsetDateTime,
}

impl Position {
    /// Whether the given price breaches the stop.
    pub fn stop_triggered(&self, current_price: Decimal) -> bool {
        match self.side {
            PositionSide::Long => current_price <= self.stop_price,
            PositionSide::Short => current_price >= self.stop_price,
        }
    }

    /// Realized P&L for an exit at the given price.
    pub fn pnl_at(&self, exit_price: Decimal) -> Decimal {
        let qty = Decimal::from(self.quantity);
        match self.side {
            PositionSide::Long => (exit_price - self.entry_price) * qty,
            PositionSide::Short => (self.entry_price - exit_price) * qty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    Manual,
}

/// Record of a closed position, emitted for notification and accounting.
#[derive(Debug, Clone, Serialize)]
pub struct PositionCloseEvent {
    pub market_id: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: i64,
    pub pnl: Decimal,
    pub reason: CloseReason,
    pub bankroll_after: Decimal,
}

/// Snapshot of the book for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioStatus {
    pub bankroll: Decimal,
    pub initial_bankroll: Decimal,
    pub realized_pnl: Decimal,
    pub open_positions: Vec<Position>,
    pub closed_trades: usize,
    /// Fraction of closed trades with positive P&L.
    pub win_rate: f64,
}

struct Book {
    bankroll: Decimal,
    positions: HashMap<String, Position>,
    wins: usize,
    losses: usize,
}

/// Bankroll and position map behind one mutex.
///
/// Every mutation of the book is a single critical section so a stop-loss
/// close and a new open in the same tick window cannot interleave. The
/// bankroll changes only when a position closes.
pub struct PortfolioState {
    initial_bankroll: Decimal,
    book: Mutex<Book>,
}

impl PortfolioState {
    pub fn new(initial_bankroll: Decimal) -> Self {
        Self {
            initial_bankroll,
            book: Mutex::new(Book {
                bankroll: initial_bankroll,
                positions: HashMap::new(),
                wins: 0,
                losses: 0,
            }),
        }
    }

    pub fn bankroll(&self) -> Decimal {
        self.lock().bankroll
    }

    pub fn has_position(&self, market_id: &str) -> bool {
        self.lock().positions.contains_key(market_id)
    }

    /// Open a position, deriving the stop price from the entry.
    ///
    /// Rejects duplicate markets, non-positive quantities, and positions
    /// whose notional exceeds `max_position_value`.
    pub fn open_position(
        &self,
        market_id: &str,
        side: PositionSide,
        entry_price: Decimal,
        quantity: i64,
        stop_loss_pct: Decimal,
        max_position_value: Decimal,
        strategy: &str,
    ) -> Result<Position, TradingError> {
        if quantity <= 0 {
            return Err(TradingError::InvalidQuantity(quantity));
        }
        let position_value = entry_price * Decimal::from(quantity);
        if position_value > max_position_value {
            return Err(TradingError::RiskLimitExceeded {
                position_value,
                max_allowed: max_position_value,
            });
        }

        let stop_price = match side {
            PositionSide::Long => entry_price * (Decimal::ONE - stop_loss_pct),
            PositionSide::Short => entry_price * (Decimal::ONE + stop_loss_pct),
        };
        let position = Position {
            market_id: market_id.to_string(),
            side,
            entry_price,
            quantity,
            stop_price,
            strategy: strategy.to_string(),
            opened_at: OffsetDateTime::now_utc(),
        };

        let mut book = self.lock();
        if book.positions.contains_key(market_id) {
            return Err(TradingError::PositionExists {
                market_id: market_id.to_string(),
            });
        }
        book.positions.insert(market_id.to_string(), position.clone());
        info!(
            market_id,
            %side,
            %entry_price,
            quantity,
            %stop_price,
            strategy,
            "position opened"
        );
        Ok(position)
    }

    /// Close a position at the given price, settling P&L into the bankroll.
    pub fn close_position(
        &self,
        market_id: &str,
        exit_price: Decimal,
        reason: CloseReason,
    ) -> Result<PositionCloseEvent, TradingError> {
        let mut book = self.lock();
        let position = book.positions.remove(market_id).ok_or_else(|| {
            TradingError::UnknownPosition {
                market_id: market_id.to_string(),
            }
        })?;
        Ok(Self::settle(&mut book, position, exit_price, reason))
    }

    /// Check every open position against the latest prices and force-close
    /// breaches. Runs entirely under the book lock.
    pub fn sweep_stops(&self, prices: &HashMap<String, Decimal>) -> Vec<PositionCloseEvent> {
        let mut book = self.lock();
        let breached: Vec<String> = book
            .positions
            .iter()
            .filter(|(id, p)| {
                prices.get(*id).is_some_and(|price| p.stop_triggered(*price))
            })
            .map(|(id, _)| id.clone())
            .collect();

        let mut events = Vec::with_capacity(breached.len());
        for market_id in breached {
            if let (Some(position), Some(price)) =
                (book.positions.remove(&market_id), prices.get(&market_id))
            {
                warn!(
                    market_id,
                    %price,
                    stop = %position.stop_price,
                    "stop loss triggered"
                );
                events.push(Self::settle(&mut book, position, *price, CloseReason::StopLoss));
            }
        }
        events
    }

    pub fn status(&self) -> PortfolioStatus {
        let book = self.lock();
        let closed = book.wins + book.losses;
        PortfolioStatus {
            bankroll: book.bankroll,
            initial_bankroll: self.initial_bankroll,
            realized_pnl: book.bankroll - self.initial_bankroll,
            open_positions: book.positions.values().cloned().collect(),
            closed_trades: closed,
            win_rate: if closed > 0 {
                book.wins as f64 / closed as f64
            } else {
                0.0
            },
        }
    }

    fn settle(
        book: &mut Book,
        position: Position,
        exit_price: Decimal,
        reason: CloseReason,
    ) -> PositionCloseEvent {
        let pnl = position.pnl_at(exit_price);
        book.bankroll += pnl;
        if pnl > Decimal::ZERO {
            book.wins += 1;
        } else {
            book.losses += 1;
        }
        info!(
            market_id = %position.market_id,
            %pnl,
            %reason,
            bankroll = %book.bankroll,
            "position closed"
        );
        crate::metrics::record_position_closed(&reason);
        PositionCloseEvent {
            market_id: position.market_id,
            side: position.side,
            entry_price: position.entry_price,
            exit_price,
            quantity: position.quantity,
            pnl,
            reason,
            bankroll_after: book.bankroll,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Book> {
        // A poisoned book means a panic mid-update; propagating the panic is
        // the only safe option for money state.
        self.book.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn portfolio() -> PortfolioState {
        PortfolioState::new(dec!(10000))
    }

    fn open_long(p: &PortfolioState, id: &str, entry: Decimal, qty: i64) -> Position {
        p.open_position(id, PositionSide::Long, entry, qty, dec!(0.05), dec!(1000), "test")
            .unwrap()
    }

    #[test]
    fn long_stop_sits_below_entry() {
        let p = portfolio();
        let position = open_long(&p, "m1", dec!(0.60), 100);
        assert_eq!(position.stop_price, dec!(0.57));
        assert!(position.stop_triggered(dec!(0.57)));
        assert!(!position.stop_triggered(dec!(0.58)));
    }

    #[test]
    fn short_stop_sits_above_entry() {
        let p = portfolio();
        let position = p
            .open_position("m1", PositionSide::Short, dec!(0.40), 100, dec!(0.05), dec!(1000), "test")
            .unwrap();
        assert_eq!(position.stop_price, dec!(0.42));
        assert!(position.stop_triggered(dec!(0.42)));
        assert!(!position.stop_triggered(dec!(0.41)));
    }

    #[test]
    fn duplicate_market_is_rejected() {
        let p = portfolio();
        open_long(&p, "m1", dec!(0.50), 10);
        let err = p
            .open_position("m1", PositionSide::Long, dec!(0.50), 10, dec!(0.05), dec!(1000), "test")
            .unwrap_err();
        assert!(matches!(err, TradingError::PositionExists { .. }));
    }

    #[test]
    fn oversized_position_is_rejected() {
        let p = portfolio();
        let err = p
            .open_position("m1", PositionSide::Long, dec!(0.50), 5000, dec!(0.05), dec!(1000), "test")
            .unwrap_err();
        assert!(matches!(
            err,
            TradingError::RiskLimitExceeded { position_value, .. } if position_value == dec!(2500)
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let p = portfolio();
        let err = p
            .open_position("m1", PositionSide::Long, dec!(0.50), 0, dec!(0.05), dec!(1000), "test")
            .unwrap_err();
        assert!(matches!(err, TradingError::InvalidQuantity(0)));
    }

    #[test]
    fn bankroll_moves_only_on_close() {
        let p = portfolio();
        open_long(&p, "m1", dec!(0.50), 100);
        assert_eq!(p.bankroll(), dec!(10000));

        let event = p.close_position("m1", dec!(0.62), CloseReason::Manual).unwrap();
        assert_eq!(event.pnl, dec!(12.00));
        assert_eq!(p.bankroll(), dec!(10012.00));
    }

    #[test]
    fn short_pnl_is_inverted() {
        let p = portfolio();
        p.open_position("m1", PositionSide::Short, dec!(0.70), 50, dec!(0.05), dec!(1000), "test")
            .unwrap();
        let event = p.close_position("m1", dec!(0.60), CloseReason::Manual).unwrap();
        assert_eq!(event.pnl, dec!(5.00));
    }

    #[test]
    fn closing_unknown_market_fails() {
        let p = portfolio();
        let err = p.close_position("nope", dec!(0.50), CloseReason::Manual).unwrap_err();
        assert!(matches!(err, TradingError::UnknownPosition { .. }));
    }

    #[test]
    fn sweep_closes_only_breached_positions() {
        let p = portfolio();
        open_long(&p, "safe", dec!(0.50), 100);
        open_long(&p, "breached", dec!(0.60), 100);

        let prices = HashMap::from([
            ("safe".to_string(), dec!(0.49)),
            ("breached".to_string(), dec!(0.55)),
        ]);
        let events = p.sweep_stops(&prices);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].market_id, "breached");
        assert_eq!(events[0].reason, CloseReason::StopLoss);
        assert_eq!(events[0].pnl, dec!(-5.00));
        assert!(p.has_position("safe"));
        assert!(!p.has_position("breached"));
        assert_eq!(p.bankroll(), dec!(9995.00));
    }

    #[test]
    fn sweep_ignores_markets_without_prices() {
        let p = portfolio();
        open_long(&p, "unpriced", dec!(0.60), 100);
        assert!(p.sweep_stops(&HashMap::new()).is_empty());
        assert!(p.has_position("unpriced"));
    }

    #[test]
    fn status_tracks_wins_and_losses() {
        let p = portfolio();
        open_long(&p, "w", dec!(0.50), 100);
        open_long(&p, "l", dec!(0.50), 100);
        p.close_position("w", dec!(0.55), CloseReason::Manual).unwrap();
        p.close_position("l", dec!(0.48), CloseReason::Manual).unwrap();

        let status = p.status();
        assert_eq!(status.closed_trades, 2);
        assert_eq!(status.win_rate, 0.5);
        assert_eq!(status.realized_pnl, dec!(3.00));
        assert!(status.open_positions.is_empty());
    }
}
