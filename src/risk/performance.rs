//! Portfolio performance statistics over a daily return series.

use serde::Serialize;

use crate::stats;

const RISK_FREE_ANNUAL: f64 = 0.02;
const TRADING_DAYS: f64 = 252.0;

/// Annualized performance summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceReport {
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough loss on the cumulative equity curve, in [0, 1].
    pub max_drawdown: f64,
    pub annualized_volatility: f64,
    pub total_return: f64,
}

/// Compute performance statistics from a series of per-period returns.
///
/// Sharpe uses a 2% annual risk-free rate spread over 252 trading days.
/// Empty or zero-variance series report a zero Sharpe rather than dividing
/// by zero.
pub fn performance_from_returns(returns: &[f64]) -> PerformanceReport {
    if returns.is_empty() {
        return PerformanceReport::default();
    }

    let mean = stats::mean(returns);
    // Constant series land within float noise of zero; treat them as flat.
    let std = match stats::std_dev(returns) {
        s if s > f64::EPSILON => s,
        _ => 0.0,
    };
    let daily_risk_free = RISK_FREE_ANNUAL / TRADING_DAYS;
    let sharpe_ratio = if std > 0.0 {
        (mean - daily_risk_free) / std * TRADING_DAYS.sqrt()
    } else {
        0.0
    };

    // Equity curve from compounded returns.
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_drawdown: f64 = 0.0;
    for r in returns {
        equity *= 1.0 + r;
        peak = peak.max(equity);
        max_drawdown = max_drawdown.max((peak - equity) / peak);
    }

    PerformanceReport {
        sharpe_ratio,
        max_drawdown,
        annualized_volatility: std * TRADING_DAYS.sqrt(),
        total_return: equity - 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_all_zeros() {
        let report = performance_from_returns(&[]);
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.total_return, 0.0);
    }

    #[test]
    fn constant_returns_have_zero_sharpe() {
        let report = performance_from_returns(&[0.01; 20]);
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert!(report.total_return > 0.2);
    }

    #[test]
    fn steady_gains_score_a_positive_sharpe() {
        let returns = [0.010, 0.012, 0.008, 0.011, 0.009, 0.010, 0.012, 0.008];
        let report = performance_from_returns(&returns);
        assert!(report.sharpe_ratio > 0.0);
        assert_eq!(report.max_drawdown, 0.0);
    }

    #[test]
    fn drawdown_measures_peak_to_trough() {
        // Up 10%, down 20%, recover: trough sits 20% under the 1.10 peak.
        let report = performance_from_returns(&[0.10, -0.20, 0.05]);
        assert!((report.max_drawdown - 0.20).abs() < 1e-12);
        let expected_total = 1.10 * 0.80 * 1.05 - 1.0;
        assert!((report.total_return - expected_total).abs() < 1e-12);
    }

    #[test]
    fn losses_drive_sharpe_negative() {
        let report = performance_from_returns(&[-0.01, -0.02, -0.015, -0.01, -0.02]);
        assert!(report.sharpe_ratio < 0.0);
        assert!(report.total_return < 0.0);
    }
}
