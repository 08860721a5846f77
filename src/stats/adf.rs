//! Augmented Dickey-Fuller unit-root test.
//!
//! Single augmentation lag with a constant term:
//!
//! ```text
//! dy_t = c + gamma * y_{t-1} + phi * dy_{t-1} + e_t
//! ```
//!
//! The test statistic is the t-ratio on `gamma`. P-values come from linear
//! interpolation over MacKinnon-style critical points; exact tail precision
//! is not needed because every consumer only compares against 0.01/0.05/0.10.

use crate::error::StatFailure;
use crate::stats::ols::fit_ols;

/// Minimum observations after differencing and lagging.
const MIN_OBS: usize = 10;

/// Critical points for the constant-only ADF distribution, as
/// (test statistic, p-value) pairs sorted by statistic.
const ADF_P_TABLE: &[(f64, f64)] = &[
    (-4.80, 0.0005),
    (-3.43, 0.01),
    (-2.86, 0.05),
    (-2.57, 0.10),
    (-1.94, 0.30),
    (-1.20, 0.60),
    (0.00, 0.90),
    (2.00, 0.999),
];

/// Critical points for the Engle-Granger residual distribution (two
/// variables, constant in the cointegrating regression).
pub(crate) const ENGLE_GRANGER_P_TABLE: &[(f64, f64)] = &[
    (-5.50, 0.0005),
    (-3.90, 0.01),
    (-3.34, 0.05),
    (-3.04, 0.10),
    (-2.45, 0.30),
    (-1.60, 0.70),
    (0.00, 0.95),
    (2.00, 0.999),
];

/// ADF test outcome.
#[derive(Debug, Clone)]
pub struct AdfResult {
    /// t-ratio on the lagged-level coefficient.
    pub test_statistic: f64,
    /// Approximate p-value in [0, 1].
    pub p_value: f64,
}

/// Run the ADF test on a series. Structured failure for degenerate input.
pub fn adf_test(series: &[f64]) -> Result<AdfResult, StatFailure> {
    let t_stat = unit_root_t_stat(series)?;
    Ok(AdfResult {
        test_statistic: t_stat,
        p_value: interpolate_p(t_stat, ADF_P_TABLE),
    })
}

/// t-ratio on `gamma` in the augmented regression. Shared with the
/// Engle-Granger residual step, which applies different critical points.
pub(crate) fn unit_root_t_stat(series: &[f64]) -> Result<f64, StatFailure> {
    let n = series.len();
    if n < MIN_OBS + 2 {
        return Err(StatFailure::InsufficientData {
            required: MIN_OBS + 2,
            actual: n,
        });
    }

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Rows t = 1..len(diffs): dy_t on [1, y_{t-1}, dy_{t-1}].
    let rows = diffs.len() - 1;
    let y_dep: Vec<f64> = diffs[1..].to_vec();
    let ones = vec![1.0; rows];
    let lag_level: Vec<f64> = series[1..n - 1].to_vec();
    let lag_diff: Vec<f64> = diffs[..rows].to_vec();

    let fit = fit_ols(&y_dep, &[&ones, &lag_level, &lag_diff])?;
    let t = fit.t_stat(1);
    if !t.is_finite() {
        return Err(StatFailure::Numerical("non-finite test statistic".to_string()));
    }
    Ok(t)
}

/// Piecewise-linear interpolation of a p-value from a critical-point table.
pub(crate) fn interpolate_p(stat: f64, table: &[(f64, f64)]) -> f64 {
    if stat <= table[0].0 {
        return table[0].1;
    }
    if stat >= table[table.len() - 1].0 {
        return table[table.len() - 1].1;
    }
    for pair in table.windows(2) {
        let (s0, p0) = pair[0];
        let (s1, p1) = pair[1];
        if stat <= s1 {
            let frac = (stat - s0) / (s1 - s0);
            return p0 + frac * (p1 - p0);
        }
    }
    table[table.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::testutil::{lcg_noise, random_walk};

    #[test]
    fn stationary_noise_rejects_unit_root() {
        // White noise mean-reverts immediately; the unit-root null should be
        // rejected comfortably at 5%.
        let series = lcg_noise(7, 120);
        let result = adf_test(&series).unwrap();
        assert!(result.test_statistic < -3.0);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn random_walk_fails_to_reject() {
        let series = random_walk(11, 200, 50.0, 1.0);
        let result = adf_test(&series).unwrap();
        assert!(result.p_value > 0.10);
    }

    #[test]
    fn short_series_is_structured_failure() {
        let err = adf_test(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, StatFailure::InsufficientData { .. }));
    }

    #[test]
    fn constant_series_is_numerical_failure() {
        // All diffs are zero: the regression matrix is singular.
        let series = vec![5.0; 60];
        let err = adf_test(&series).unwrap_err();
        assert!(matches!(err, StatFailure::Numerical(_)));
    }

    #[test]
    fn p_interpolation_is_monotone_and_clamped() {
        assert_eq!(interpolate_p(-99.0, ADF_P_TABLE), 0.0005);
        assert_eq!(interpolate_p(99.0, ADF_P_TABLE), 0.999);
        let p_mid = interpolate_p(-3.0, ADF_P_TABLE);
        assert!(p_mid > 0.01 && p_mid < 0.10);
        assert!(interpolate_p(-3.4, ADF_P_TABLE) < interpolate_p(-2.6, ADF_P_TABLE));
    }
}
