//! Priority-ordered decision arbitration across strategies.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use strum::Display;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::risk::KellySizer;

use super::strategy::{SignalDetail, Strategy, StrategyContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// The single sized order a decision cycle may emit.
#[derive(Debug, Clone, Serialize)]
pub struct TradeDecision {
    /// `{strategy}_{market}_{unix_ts}`.
    pub trade_id: String,
    pub market_id: String,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: Decimal,
    pub strategy: String,
    pub confidence: f64,
    /// Bankroll fraction the Kelly sizer settled on.
    pub kelly_fraction: f64,
    pub detail: SignalDetail,
}

/// Runs strategies in fixed priority order and sizes the first signal.
///
/// News sentiment outranks statistical arbitrage, which outranks volatility.
/// No blending: once a strategy fires, the rest are not evaluated. A
/// strategy error is logged and treated as no signal from that strategy.
pub struct DecisionArbiter {
    strategies: Vec<Box<dyn Strategy>>,
    sizer: KellySizer,
}

impl DecisionArbiter {
    /// Build an arbiter from strategies already in priority order.
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            strategies,
            sizer: KellySizer::default(),
        }
    }

    /// Run one arbitration pass. Sizing always goes through the Kelly layer;
    /// strategy-internal sizing hints are advisory only.
    pub fn decide(&self, ctx: &StrategyContext, bankroll: Decimal) -> Option<TradeDecision> {
        for strategy in &self.strategies {
            if !strategy.enabled(ctx.settings) {
                debug!(strategy = strategy.name(), "strategy disabled, skipping");
                continue;
            }
            let signal = match strategy.evaluate(ctx) {
                Ok(Some(signal)) => signal,
                Ok(None) => continue,
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "strategy evaluation failed");
                    crate::metrics::inc_strategy_failures(strategy.name());
                    continue;
                }
            };

            // A signal naming a market the book no longer tracks is a
            // strategy-level failure; lower priorities still get their turn.
            let Some(price) = ctx
                .markets
                .iter()
                .find(|m| m.id == signal.market_id)
                .map(|m| m.current_price)
            else {
                warn!(
                    strategy = strategy.name(),
                    market_id = %signal.market_id,
                    "signal names an untracked market"
                );
                crate::metrics::inc_strategy_failures(strategy.name());
                continue;
            };

            let fraction = self.sizer.fraction(
                signal.confidence,
                decimal_to_f64(ctx.settings.kelly_fraction, 0.5),
                decimal_to_f64(ctx.settings.max_position_size_pct, 0.10),
            );
            let quantity = self.sizer.quantity(bankroll, fraction, price);
            let unix_ts = OffsetDateTime::now_utc().unix_timestamp();

            return Some(TradeDecision {
                trade_id: format!("{}_{}_{}", strategy.name(), signal.market_id, unix_ts),
                market_id: signal.market_id,
                side: signal.side,
                quantity,
                price,
                strategy: strategy.name().to_string(),
                confidence: signal.confidence,
                kelly_fraction: fraction,
                detail: signal.detail,
            });
        }
        None
    }
}

fn decimal_to_f64(value: Decimal, fallback: f64) -> f64 {
    value.to_f64().unwrap_or(fallback)
}
