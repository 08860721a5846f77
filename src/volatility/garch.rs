//! GARCH(1,1) conditional volatility fitted by grid search.

use tracing::debug;

use crate::error::StatFailure;
use crate::stats::{self, log_returns};
use crate::volatility::TRADING_DAYS;

/// Observations required before a fit is attempted.
pub const MIN_GARCH_OBSERVATIONS: usize = 100;

/// A fitted GARCH(1,1) model: sigma2_t = omega + alpha * eps2_{t-1} + beta * sigma2_{t-1}.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GarchFit {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    /// alpha + beta; values near 1 mean shocks decay slowly.
    pub persistence: f64,
    /// Per-step conditional volatility path, one entry per return.
    pub conditional_volatility: Vec<f64>,
    /// One-step-ahead volatility forecast, annualized.
    pub forecast_volatility: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
}

/// Fits GARCH(1,1) over a coarse (alpha, beta) grid with variance targeting.
///
/// Omega is pinned to `var * (1 - alpha - beta)` for each candidate so the
/// model's unconditional variance always matches the sample, leaving a
/// two-dimensional search. Candidates with alpha + beta >= 1 are skipped.
#[derive(Debug, Clone, Default)]
pub struct GarchModel;

impl GarchModel {
    /// Fit the model to a price history.
    pub fn fit(&self, prices: &[f64]) -> Result<GarchFit, StatFailure> {
        if prices.len() < MIN_GARCH_OBSERVATIONS + 1 {
            return Err(StatFailure::InsufficientData {
                required: MIN_GARCH_OBSERVATIONS + 1,
                actual: prices.len(),
            });
        }
        self.fit_returns(&log_returns(prices))
    }

    /// Fit the model to a return series directly.
    pub fn fit_returns(&self, returns: &[f64]) -> Result<GarchFit, StatFailure> {
        if returns.len() < MIN_GARCH_OBSERVATIONS {
            return Err(StatFailure::InsufficientData {
                required: MIN_GARCH_OBSERVATIONS,
                actual: returns.len(),
            });
        }

        let mean = stats::mean(returns);
        let residuals: Vec<f64> = returns.iter().map(|r| r - mean).collect();
        let sample_var = residuals.iter().map(|e| e * e).sum::<f64>() / residuals.len() as f64;
        if sample_var <= f64::EPSILON {
            return Err(StatFailure::Numerical(
                "zero return variance, nothing to fit".to_string(),
            ));
        }

        let mut best: Option<(f64, f64, f64, f64)> = None;
        for i in 0..13 {
            let alpha = 0.01 + 0.02 * i as f64;
            for j in 0..19 {
                let beta = 0.60 + 0.02 * j as f64;
                if alpha + beta >= 0.999 {
                    continue;
                }
                let omega = sample_var * (1.0 - alpha - beta);
                let ll = log_likelihood(&residuals, sample_var, omega, alpha, beta);
                if best.map_or(true, |(b, ..)| ll > b) {
                    best = Some((ll, alpha, beta, omega));
                }
            }
        }
        let (log_lik, alpha, beta, omega) = best.ok_or_else(|| {
            StatFailure::Numerical("empty parameter grid".to_string())
        })?;

        // Replay the variance recursion with the winning parameters.
        let mut variance = sample_var;
        let mut conditional = Vec::with_capacity(residuals.len());
        for e in &residuals {
            conditional.push(variance.sqrt());
            variance = omega + alpha * e * e + beta * variance;
        }
        // `variance` now holds the one-step-ahead forecast.
        let forecast_volatility = variance.sqrt() * TRADING_DAYS.sqrt();

        let n = residuals.len() as f64;
        let k = 3.0;
        debug!(alpha, beta, persistence = alpha + beta, "garch fit selected");

        Ok(GarchFit {
            omega,
            alpha,
            beta,
            persistence: alpha + beta,
            conditional_volatility: conditional,
            forecast_volatility,
            log_likelihood: log_lik,
            aic: 2.0 * k - 2.0 * log_lik,
            bic: k * n.ln() - 2.0 * log_lik,
        })
    }
}

fn log_likelihood(residuals: &[f64], initial_var: f64, omega: f64, alpha: f64, beta: f64) -> f64 {
    const LN_2PI: f64 = 1.8378770664093453;
    let mut variance = initial_var;
    let mut ll = 0.0;
    for e in residuals {
        ll += -0.5 * (LN_2PI + variance.ln() + e * e / variance);
        variance = omega + alpha * e * e + beta * variance;
    }
    ll
}
