//! Statistical primitives shared by the arbitrage and volatility engines.
//!
//! Everything in here operates on plain `f64` series. Money never enters this
//! module; conversions to `Decimal` happen at the decision boundary.

pub mod adf;
pub mod cointegration;
pub mod ols;

pub use adf::{adf_test, AdfResult};
pub use cointegration::{CointegrationResult, CointegrationTester, DEFAULT_MIN_HISTORY_POINTS};

/// Arithmetic mean of a slice. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0, matching numpy's default).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Log returns: `ln(p_t / p_{t-1})` for consecutive price pairs.
///
/// Non-positive prices make the log undefined; callers guard for that before
/// invoking (see the volatility estimator).
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

/// Standardize a series to zero mean and unit variance using its own
/// statistics. A zero-variance series maps to all zeros rather than NaN,
/// matching the degenerate-input contract of the spread engine.
pub fn standardize(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let s = std_dev(values);
    if s <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - m) / s).collect()
}

/// Deterministic fixture generators, shared by unit and integration tests.
pub mod testutil {
    /// Deterministic pseudo-random values in [-1, 1) for test fixtures.
    pub fn lcg_noise(seed: u64, n: usize) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 33) as f64 / f64::from(1u32 << 31)) - 1.0
            })
            .collect()
    }

    /// Random-walk price series starting at `start` with steps scaled by `step`.
    pub fn random_walk(seed: u64, n: usize, start: f64, step: f64) -> Vec<f64> {
        let noise = lcg_noise(seed, n);
        let mut prices = Vec::with_capacity(n);
        let mut level = start;
        for e in noise {
            level += e * step;
            prices.push(level);
        }
        prices
    }
}
