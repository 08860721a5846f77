//! Kelly-criterion position sizing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

pub const DEFAULT_WIN_LOSS_RATIO: f64 = 2.0;

/// Bankroll fraction used when confidence is outside (0, 1).
const DEGENERATE_FRACTION: f64 = 0.02;
/// Smallest fraction a live signal is ever sized at.
const MIN_FRACTION: f64 = 0.01;

/// Sizes positions as a bankroll fraction from signal confidence.
#[derive(Debug, Clone)]
pub struct KellySizer {
    win_loss_ratio: f64,
}

impl Default for KellySizer {
    fn default() -> Self {
        Self::new(DEFAULT_WIN_LOSS_RATIO)
    }
}

impl KellySizer {
    pub fn new(win_loss_ratio: f64) -> Self {
        Self { win_loss_ratio }
    }

    /// Bankroll fraction for a signal of the given confidence.
    ///
    /// `f = confidence * wl / (wl + 1)`, scaled by the damping factor
    /// (half-Kelly at 0.5), clamped to [1%, max_fraction]. Confidence at or
    /// outside (0, 1) short-circuits to the flat 2% size.
    pub fn fraction(&self, confidence: f64, damping: f64, max_fraction: f64) -> f64 {
        if confidence <= 0.0 || confidence >= 1.0 {
            return DEGENERATE_FRACTION;
        }
        let raw = confidence * self.win_loss_ratio / (self.win_loss_ratio + 1.0);
        (raw * damping).clamp(MIN_FRACTION, max_fraction)
    }

    /// Contract count for a bankroll fraction at the current price.
    ///
    /// Always at least one contract.
    pub fn quantity(&self, bankroll: Decimal, fraction: f64, price: Decimal) -> i64 {
        if price <= Decimal::ZERO {
            warn!(%price, "non-positive price, sizing a single contract");
            return 1;
        }
        let fraction = Decimal::from_f64_retain(fraction).unwrap_or(Decimal::ZERO);
        (bankroll * fraction / price)
            .floor()
            .to_i64()
            .unwrap_or(0)
            .max(1)
    }
}
