//! Trade signals derived from the volatility regime and recent price trend.

use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::volatility::regime::{RegimeAssessment, VolatilityRegime};

const TREND_LOOKBACK: usize = 20;

/// Direction of the recent price drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Up,
    Down,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilitySignalKind {
    /// High volatility after a run-up: fade the move short.
    MeanReversionShort,
    /// High volatility after a sell-off: fade the move long.
    MeanReversionLong,
    /// Compressed volatility, position for an expansion either way.
    BreakoutSetup,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolatilitySignal {
    pub kind: VolatilitySignalKind,
    pub confidence: f64,
    pub regime: VolatilityRegime,
    pub trend: PriceTrend,
}

/// Turns a regime assessment plus recent prices into an optional signal.
#[derive(Debug, Clone, Default)]
pub struct VolatilitySignalGenerator;

impl VolatilitySignalGenerator {
    /// High-volatility regimes fade the prevailing trend, low-volatility
    /// regimes set up for a breakout, everything else stays flat.
    pub fn generate(
        &self,
        assessment: &RegimeAssessment,
        prices: &[f64],
    ) -> Option<VolatilitySignal> {
        let trend = detect_trend(prices);

        let signal = match assessment.regime {
            VolatilityRegime::High if assessment.confidence > 0.6 => match trend {
                PriceTrend::Up => Some((
                    VolatilitySignalKind::MeanReversionShort,
                    assessment.confidence * 0.8,
                )),
                PriceTrend::Down => Some((
                    VolatilitySignalKind::MeanReversionLong,
                    assessment.confidence * 0.8,
                )),
                PriceTrend::Sideways => None,
            },
            VolatilityRegime::Low if assessment.confidence > 0.5 => Some((
                VolatilitySignalKind::BreakoutSetup,
                assessment.confidence * 0.6,
            )),
            _ => None,
        };

        signal.map(|(kind, confidence)| {
            debug!(%kind, confidence, %trend, "volatility signal generated");
            VolatilitySignal {
                kind,
                confidence,
                regime: assessment.regime,
                trend,
            }
        })
    }
}

/// Drift over the last 20 prices: more than 2% up or down breaks sideways.
pub fn detect_trend(prices: &[f64]) -> PriceTrend {
    let tail = &prices[prices.len().saturating_sub(TREND_LOOKBACK)..];
    let (Some(first), Some(last)) = (tail.first(), tail.last()) else {
        return PriceTrend::Sideways;
    };
    if *last > first * 1.02 {
        PriceTrend::Up
    } else if *last < first * 0.98 {
        PriceTrend::Down
    } else {
        PriceTrend::Sideways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(regime: VolatilityRegime, confidence: f64) -> RegimeAssessment {
        RegimeAssessment {
            regime,
            percentile: 50.0,
            confidence,
            historical_mean: 0.3,
            historical_median: 0.3,
            historical_std: 0.1,
        }
    }

    fn trending_up() -> Vec<f64> {
        (0..30).map(|i| 50.0 + i as f64 * 0.5).collect()
    }

    fn trending_down() -> Vec<f64> {
        (0..30).map(|i| 50.0 - i as f64 * 0.5).collect()
    }

    #[test]
    fn high_volatility_fades_the_trend() {
        let generator = VolatilitySignalGenerator;
        let high = assessment(VolatilityRegime::High, 0.9);

        let short = generator.generate(&high, &trending_up()).unwrap();
        assert_eq!(short.kind, VolatilitySignalKind::MeanReversionShort);
        assert!((short.confidence - 0.72).abs() < 1e-12);

        let long = generator.generate(&high, &trending_down()).unwrap();
        assert_eq!(long.kind, VolatilitySignalKind::MeanReversionLong);
        assert_eq!(long.trend, PriceTrend::Down);
    }

    #[test]
    fn high_volatility_sideways_stays_flat() {
        let generator = VolatilitySignalGenerator;
        let high = assessment(VolatilityRegime::High, 0.9);
        assert!(generator.generate(&high, &vec![50.0; 30]).is_none());
    }

    #[test]
    fn low_volatility_sets_up_a_breakout() {
        let generator = VolatilitySignalGenerator;
        let low = assessment(VolatilityRegime::Low, 0.8);
        let signal = generator.generate(&low, &vec![50.0; 30]).unwrap();
        assert_eq!(signal.kind, VolatilitySignalKind::BreakoutSetup);
        assert!((signal.confidence - 0.48).abs() < 1e-12);
    }

    #[test]
    fn weak_confidence_produces_nothing() {
        let generator = VolatilitySignalGenerator;
        assert!(generator
            .generate(&assessment(VolatilityRegime::High, 0.5), &trending_up())
            .is_none());
        assert!(generator
            .generate(&assessment(VolatilityRegime::Low, 0.4), &trending_up())
            .is_none());
        assert!(generator
            .generate(&assessment(VolatilityRegime::Normal, 1.0), &trending_up())
            .is_none());
        assert!(generator
            .generate(&assessment(VolatilityRegime::Unknown, 1.0), &trending_up())
            .is_none());
    }

    #[test]
    fn trend_thresholds_are_two_percent() {
        let mut prices = vec![100.0; 20];
        prices[19] = 102.5;
        assert_eq!(detect_trend(&prices), PriceTrend::Up);
        prices[19] = 101.5;
        assert_eq!(detect_trend(&prices), PriceTrend::Sideways);
        prices[19] = 97.5;
        assert_eq!(detect_trend(&prices), PriceTrend::Down);
        assert_eq!(detect_trend(&[]), PriceTrend::Sideways);
    }
}
