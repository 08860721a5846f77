//! Outbound notifications for trade and position events.

use std::sync::Mutex;

use tracing::{info, warn};

use crate::risk::PositionCloseEvent;
use crate::trader::TradeDecision;

/// Delivery seam for trade events.
///
/// The default sink writes structured log lines; a chat-service
/// implementation would slot in here without touching the trading loop.
pub trait Notifier: Send + Sync {
    fn trade_executed(&self, decision: &TradeDecision);
    fn position_closed(&self, event: &PositionCloseEvent);
    fn alert(&self, message: &str);
}

/// Notifier that emits structured log events.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn trade_executed(&self, decision: &TradeDecision) {
        info!(
            trade_id = %decision.trade_id,
            market_id = %decision.market_id,
            side = %decision.side,
            quantity = decision.quantity,
            price = %decision.price,
            strategy = %decision.strategy,
            "trade executed"
        );
    }

    fn position_closed(&self, event: &PositionCloseEvent) {
        info!(
            market_id = %event.market_id,
            pnl = %event.pnl,
            reason = %event.reason,
            bankroll = %event.bankroll_after,
            "position closed"
        );
    }

    fn alert(&self, message: &str) {
        warn!(message, "alert");
    }
}

/// Notifier that records event descriptions, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

impl Notifier for RecordingNotifier {
    fn trade_executed(&self, decision: &TradeDecision) {
        self.record(format!("trade:{}", decision.trade_id));
    }

    fn position_closed(&self, event: &PositionCloseEvent) {
        self.record(format!("close:{}:{}", event.market_id, event.reason));
    }

    fn alert(&self, message: &str) {
        self.record(format!("alert:{message}"));
    }
}
