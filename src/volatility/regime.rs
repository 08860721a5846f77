//! Volatility regime classification against observed history.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::stats;

/// Regime bucket for an annualized volatility reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
    /// No history recorded yet.
    Unknown,
}

/// Classification of a single volatility reading.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeAssessment {
    pub regime: VolatilityRegime,
    /// Position of the reading on a 0-100 scale.
    pub percentile: f64,
    /// How far from the 50th percentile the reading sits, capped at 1.
    pub confidence: f64,
    pub historical_mean: f64,
    pub historical_median: f64,
    pub historical_std: f64,
}

/// Buckets volatility readings into low / normal / high regimes.
///
/// The percentile scale maps the reading directly: sub-1.0 volatilities map
/// to `vol * 100`, larger ones to `vol * 10` capped at 99. Readings below the
/// 25th mark are low, below the 75th normal, the rest high.
#[derive(Debug, Clone, Default)]
pub struct RegimeClassifier {
    history: Vec<f64>,
}

impl RegimeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed volatility for the historical summary.
    pub fn record(&mut self, volatility: f64) {
        self.history.push(volatility);
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Classify a volatility reading.
    ///
    /// With no recorded history the result is `Unknown` at the 50th
    /// percentile with zero confidence.
    pub fn classify(&self, volatility: f64) -> RegimeAssessment {
        if self.history.is_empty() {
            return RegimeAssessment {
                regime: VolatilityRegime::Unknown,
                percentile: 50.0,
                confidence: 0.0,
                historical_mean: 0.0,
                historical_median: 0.0,
                historical_std: 0.0,
            };
        }

        let percentile = if volatility < 1.0 {
            volatility * 100.0
        } else {
            (volatility * 10.0).min(99.0)
        };

        let regime = if percentile < 25.0 {
            VolatilityRegime::Low
        } else if percentile < 75.0 {
            VolatilityRegime::Normal
        } else {
            VolatilityRegime::High
        };

        let mut sorted = self.history.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        RegimeAssessment {
            regime,
            percentile,
            confidence: ((percentile - 50.0).abs() / 25.0).min(1.0),
            historical_mean: stats::mean(&self.history),
            historical_median: median,
            historical_std: stats::std_dev(&self.history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> RegimeClassifier {
        let mut classifier = RegimeClassifier::new();
        for vol in [0.10, 0.20, 0.30, 0.40, 0.50] {
            classifier.record(vol);
        }
        classifier
    }

    #[test]
    fn empty_history_is_unknown() {
        let assessment = RegimeClassifier::new().classify(0.35);
        assert_eq!(assessment.regime, VolatilityRegime::Unknown);
        assert_eq!(assessment.percentile, 50.0);
        assert_eq!(assessment.confidence, 0.0);
    }

    #[test]
    fn buckets_follow_percentile() {
        let classifier = seeded();
        assert_eq!(classifier.classify(0.10).regime, VolatilityRegime::Low);
        assert_eq!(classifier.classify(0.50).regime, VolatilityRegime::Normal);
        assert_eq!(classifier.classify(0.90).regime, VolatilityRegime::High);
    }

    #[test]
    fn large_readings_use_the_capped_scale() {
        let classifier = seeded();
        let assessment = classifier.classify(5.0);
        assert_eq!(assessment.percentile, 50.0);
        assert_eq!(assessment.regime, VolatilityRegime::Normal);

        let extreme = classifier.classify(25.0);
        assert_eq!(extreme.percentile, 99.0);
        assert_eq!(extreme.regime, VolatilityRegime::High);
    }

    #[test]
    fn confidence_grows_away_from_the_middle() {
        let classifier = seeded();
        let mid = classifier.classify(0.50);
        assert_eq!(mid.confidence, 0.0);

        let low = classifier.classify(0.10);
        assert!((low.confidence - 1.0).abs() < 1e-12);

        let edge = classifier.classify(0.60);
        assert!((edge.confidence - 0.4).abs() < 1e-12);
    }

    #[test]
    fn historical_summary_matches_recorded_values() {
        let assessment = seeded().classify(0.30);
        assert!((assessment.historical_mean - 0.30).abs() < 1e-12);
        assert!((assessment.historical_median - 0.30).abs() < 1e-12);
        assert!(assessment.historical_std > 0.0);
    }
}
