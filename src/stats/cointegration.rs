//! Engle-Granger cointegration test between two price series.
//!
//! Step one regresses series1 on series2 (with constant); step two applies a
//! unit-root test to the residuals under Engle-Granger critical values. A
//! stationary residual means the two series share a long-run equilibrium.

use tracing::debug;

use crate::error::StatFailure;
use crate::stats::adf::{interpolate_p, unit_root_t_stat, ENGLE_GRANGER_P_TABLE};
use crate::stats::ols::fit_ols;

/// Default minimum series length for the test to be meaningful.
pub const DEFAULT_MIN_HISTORY_POINTS: usize = 50;

/// Critical values at the 1% / 5% / 10% levels for the two-variable
/// Engle-Granger residual test.
pub const CRITICAL_VALUES: (f64, f64, f64) = (-3.90, -3.34, -3.04);

/// Outcome of a cointegration test. Immutable once computed; failures are
/// encoded in `failure`, never raised.
#[derive(Debug, Clone)]
pub struct CointegrationResult {
    /// Decision at the 5% significance level.
    pub is_cointegrated: bool,
    /// Approximate p-value in [0, 1].
    pub p_value: f64,
    /// Engle-Granger test statistic (t-ratio on the residual unit root).
    pub test_statistic: f64,
    /// Critical values at (1%, 5%, 10%).
    pub critical_values: (f64, f64, f64),
    /// Confidence tier derived from the p-value: 0, 0.90, 0.95 or 0.99.
    pub confidence: f64,
    /// Structured failure reason when the test could not run.
    pub failure: Option<StatFailure>,
}

impl CointegrationResult {
    fn not_cointegrated(failure: StatFailure) -> Self {
        Self {
            is_cointegrated: false,
            p_value: 1.0,
            test_statistic: 0.0,
            critical_values: CRITICAL_VALUES,
            confidence: 0.0,
            failure: Some(failure),
        }
    }
}

/// Tests whether two price series share a long-run equilibrium relationship.
#[derive(Debug, Clone)]
pub struct CointegrationTester {
    min_history_points: usize,
}

impl Default for CointegrationTester {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HISTORY_POINTS)
    }
}

impl CointegrationTester {
    /// Create a tester with a custom minimum history requirement.
    pub fn new(min_history_points: usize) -> Self {
        Self { min_history_points }
    }

    /// Run the Engle-Granger test. Total function: every failure mode maps to
    /// a non-cointegrated result with the reason attached.
    pub fn test(&self, series1: &[f64], series2: &[f64]) -> CointegrationResult {
        let shortest = series1.len().min(series2.len());
        if shortest < self.min_history_points {
            return CointegrationResult::not_cointegrated(StatFailure::InsufficientData {
                required: self.min_history_points,
                actual: shortest,
            });
        }
        let n = shortest;

        // Align unequal histories on their most recent n samples.
        let residuals = match cointegrating_residuals(
            &series1[series1.len() - n..],
            &series2[series2.len() - n..],
        ) {
            Ok(r) => r,
            Err(failure) => {
                debug!(%failure, "cointegrating regression failed");
                return CointegrationResult::not_cointegrated(failure);
            }
        };

        let t_stat = match unit_root_t_stat(&residuals) {
            Ok(t) => t,
            Err(failure) => {
                debug!(%failure, "residual unit-root test failed");
                return CointegrationResult::not_cointegrated(failure);
            }
        };

        let p_value = interpolate_p(t_stat, ENGLE_GRANGER_P_TABLE);
        CointegrationResult {
            is_cointegrated: p_value < 0.05,
            p_value,
            test_statistic: t_stat,
            critical_values: CRITICAL_VALUES,
            confidence: confidence_tier(p_value),
            failure: None,
        }
    }
}

/// Residuals of the cointegrating regression series1 = a + b * series2.
fn cointegrating_residuals(series1: &[f64], series2: &[f64]) -> Result<Vec<f64>, StatFailure> {
    let ones = vec![1.0; series1.len()];
    let fit = fit_ols(series1, &[&ones, series2])?;
    Ok(fit.residuals)
}

/// Confidence tiers: p<0.01 gives 0.99, p<0.05 gives 0.95, p<0.10 gives
/// 0.90, anything weaker gives 0.
fn confidence_tier(p_value: f64) -> f64 {
    if p_value < 0.01 {
        0.99
    } else if p_value < 0.05 {
        0.95
    } else if p_value < 0.10 {
        0.90
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::testutil::{lcg_noise, random_walk};

    #[test]
    fn short_series_is_not_cointegrated_and_does_not_raise() {
        let tester = CointegrationTester::default();
        let short: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let result = tester.test(&short, &short);

        assert!(!result.is_cointegrated);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(matches!(
            result.failure,
            Some(StatFailure::InsufficientData { required: 50, actual: 10 })
        ));
    }

    #[test]
    fn offset_series_with_noise_are_cointegrated() {
        // series2 tracks series1 plus zero-mean noise: the canonical
        // cointegrated pair from the scanner's point of view.
        let series1 = random_walk(3, 60, 50.0, 1.0);
        let noise = lcg_noise(91, 60);
        let series2: Vec<f64> = series1
            .iter()
            .zip(&noise)
            .map(|(p, e)| p + 0.4 * e)
            .collect();

        let tester = CointegrationTester::default();
        let result = tester.test(&series1, &series2);

        assert!(result.is_cointegrated, "p={}", result.p_value);
        assert!(result.p_value < 0.05);
        assert!(result.confidence >= 0.95);
        assert!(result.failure.is_none());
    }

    #[test]
    fn unequal_histories_are_compared_on_their_recent_overlap() {
        // series2 tracks the LAST 60 samples of a 70-sample series1; the test
        // must align on the shared recent window, not series1's oldest ticks.
        let series1 = random_walk(7, 70, 50.0, 1.0);
        let noise = lcg_noise(8, 60);
        let series2: Vec<f64> = series1[10..]
            .iter()
            .zip(&noise)
            .map(|(p, e)| p + 0.4 * e)
            .collect();

        let tester = CointegrationTester::default();
        let result = tester.test(&series1, &series2);
        assert!(result.is_cointegrated, "p={}", result.p_value);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn independent_walks_are_not_cointegrated() {
        let series1 = random_walk(5, 120, 50.0, 1.0);
        let series2 = random_walk(1234, 120, 80.0, 1.0);

        let tester = CointegrationTester::default();
        let result = tester.test(&series1, &series2);

        assert!(!result.is_cointegrated, "p={}", result.p_value);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn constant_series_reports_numerical_failure() {
        let flat = vec![5.0; 60];
        let walk = random_walk(9, 60, 50.0, 1.0);

        let tester = CointegrationTester::default();
        let result = tester.test(&walk, &flat);

        assert!(!result.is_cointegrated);
        assert!(matches!(result.failure, Some(StatFailure::Numerical(_))));
    }

    #[test]
    fn confidence_tiers_match_p_value_thresholds() {
        assert_eq!(confidence_tier(0.005), 0.99);
        assert_eq!(confidence_tier(0.03), 0.95);
        assert_eq!(confidence_tier(0.07), 0.90);
        assert_eq!(confidence_tier(0.2), 0.0);
    }
}
