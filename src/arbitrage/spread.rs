//! Spread construction and z-score analysis for a cointegrated pair.

use tracing::debug;

use crate::error::StatFailure;
use crate::stats::{self, adf_test};

/// Spread analysis for a pair of price series.
#[derive(Debug, Clone)]
pub struct SpreadResult {
    /// Elementwise difference of the two standardized series.
    pub spread: Vec<f64>,
    /// Deviation of the last spread sample from the spread mean, in standard
    /// deviations. Zero when the spread has no variance.
    pub z_score: f64,
    /// Spread mean.
    pub mean: f64,
    /// Spread standard deviation (population).
    pub std: f64,
    /// Last spread sample.
    pub latest_spread: f64,
    /// Whether the spread passes the ADF stationarity test at 5%.
    pub is_stationary: bool,
    /// ADF p-value; 1.0 when the test could not run.
    pub adf_p_value: f64,
    /// Upper alert threshold: mean + z_threshold * std.
    pub upper_threshold: f64,
    /// Lower alert threshold: mean - z_threshold * std.
    pub lower_threshold: f64,
    /// Structured failure when the spread could not be computed at all.
    pub failure: Option<StatFailure>,
}

impl SpreadResult {
    fn empty(failure: StatFailure) -> Self {
        Self {
            spread: Vec::new(),
            z_score: 0.0,
            mean: 0.0,
            std: 0.0,
            latest_spread: 0.0,
            is_stationary: false,
            adf_p_value: 1.0,
            upper_threshold: 0.0,
            lower_threshold: 0.0,
            failure: Some(failure),
        }
    }
}

/// Normalizes two price series and analyzes their spread.
#[derive(Debug, Clone)]
pub struct SpreadEngine {
    /// Z-score distance used for the alert thresholds.
    z_threshold: f64,
}

impl SpreadEngine {
    /// Create an engine with the given alert z-threshold.
    pub fn new(z_threshold: f64) -> Self {
        Self { z_threshold }
    }

    /// Compute the spread between two series.
    ///
    /// Each series is standardized independently (its own mean and variance,
    /// not a shared scaler) before taking the elementwise difference. The
    /// z-score covers only the last sample. A zero-variance spread yields
    /// z = 0, never NaN. A failed stationarity test defaults to
    /// `is_stationary = false` with p = 1.0 and does not fail the result.
    pub fn calculate(&self, series1: &[f64], series2: &[f64]) -> SpreadResult {
        let n = series1.len().min(series2.len());
        if n == 0 {
            return SpreadResult::empty(StatFailure::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        // Align on the most recent n samples: histories of different length
        // share their current tick, not their oldest one.
        let norm1 = stats::standardize(&series1[series1.len() - n..]);
        let norm2 = stats::standardize(&series2[series2.len() - n..]);
        let spread: Vec<f64> = norm1.iter().zip(&norm2).map(|(a, b)| a - b).collect();

        let mean = stats::mean(&spread);
        let std = stats::std_dev(&spread);
        let latest = spread[spread.len() - 1];
        let z_score = if std > f64::EPSILON {
            (latest - mean) / std
        } else {
            0.0
        };

        let (is_stationary, adf_p_value) = match adf_test(&spread) {
            Ok(adf) => (adf.p_value < 0.05, adf.p_value),
            Err(failure) => {
                debug!(%failure, "spread stationarity test failed");
                (false, 1.0)
            }
        };

        SpreadResult {
            z_score,
            mean,
            std,
            latest_spread: latest,
            is_stationary,
            adf_p_value,
            upper_threshold: mean + self.z_threshold * std,
            lower_threshold: mean - self.z_threshold * std,
            spread,
            failure: None,
        }
    }
}
