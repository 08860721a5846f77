//! Windowed volatility estimates from a raw price history.

use crate::error::StatFailure;
use crate::stats::{self, log_returns};
use crate::volatility::TRADING_DAYS;

pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;

/// Annualized volatility readings over the most recent window.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct VolatilityMetrics {
    /// Standard deviation of the last `window` log returns, annualized.
    pub historical: f64,
    /// Sum of absolute log returns over the window, annualized.
    pub realized: f64,
    /// Range-based proxy: mean log high/low ratio across rolling windows.
    pub parkinson: f64,
    pub window: usize,
    #[serde(skip)]
    pub failure: Option<StatFailure>,
}

/// Computes volatility metrics over a fixed lookback window.
#[derive(Debug, Clone)]
pub struct VolatilityEstimator {
    window: usize,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_VOLATILITY_WINDOW)
    }
}

impl VolatilityEstimator {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Estimate volatility from a price history.
    ///
    /// Histories shorter than the window yield zeroed metrics with the
    /// failure recorded, never a panic.
    pub fn estimate(&self, prices: &[f64]) -> VolatilityMetrics {
        if prices.len() < self.window || self.window < 2 {
            return VolatilityMetrics {
                window: self.window,
                failure: Some(StatFailure::InsufficientData {
                    required: self.window,
                    actual: prices.len(),
                }),
                ..Default::default()
            };
        }

        let returns = log_returns(prices);
        let tail = &returns[returns.len().saturating_sub(self.window)..];
        let annualize = TRADING_DAYS.sqrt();

        let historical = stats::std_dev(tail) * annualize;
        let realized: f64 = tail.iter().map(|r| r.abs()).sum::<f64>() * annualize;

        // High/low proxy over every full rolling window of raw prices.
        let ratios: Vec<f64> = prices
            .windows(self.window)
            .map(|w| {
                let high = w.iter().copied().fold(f64::MIN, f64::max);
                let low = w.iter().copied().fold(f64::MAX, f64::min);
                if low > 0.0 {
                    (high / low).ln()
                } else {
                    0.0
                }
            })
            .collect();
        let parkinson = stats::mean(&ratios) * (TRADING_DAYS / self.window as f64).sqrt();

        VolatilityMetrics {
            historical,
            realized,
            parkinson,
            window: self.window,
            failure: None,
        }
    }
}
