//! Pairwise scan of tracked markets for tradable spread dislocations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::arbitrage::spread::{SpreadEngine, SpreadResult};
use crate::market::MarketSnapshot;
use crate::stats::{CointegrationResult, CointegrationTester, DEFAULT_MIN_HISTORY_POINTS};

/// Confidence floor an opportunity must clear before execution.
pub const DEFAULT_RISK_TOLERANCE: f64 = 0.7;

/// Direction of the spread trade.
///
/// `ShortSpread` sells the rich leg and buys the cheap one when the spread is
/// stretched above its mean; `LongSpread` is the mirror trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpreadSignal {
    LongSpread,
    ShortSpread,
}

/// A cointegrated pair whose spread has left its normal band.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub market_id_1: String,
    pub market_id_2: String,
    pub signal: SpreadSignal,
    pub z_score: f64,
    /// min(|z| / 3, 1): a 3-sigma dislocation maps to full confidence.
    pub confidence: f64,
    /// Rough edge estimate, |z| scaled by one cent per sigma.
    pub expected_return: f64,
    /// Suggested bankroll fraction, min(confidence * |z| / 4, 1).
    pub suggested_position_size: f64,
    #[serde(skip)]
    pub cointegration: CointegrationResult,
    #[serde(skip)]
    pub spread: SpreadResult,
}

/// Outcome of the execution gate for a single opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionDecision {
    pub execute: bool,
    pub reason: String,
}

/// Scans every market pair for cointegration and spread dislocation.
#[derive(Debug, Clone)]
pub struct ArbitrageScanner {
    tester: CointegrationTester,
    spread_engine: SpreadEngine,
    z_threshold: f64,
    min_history_points: usize,
}

impl ArbitrageScanner {
    pub fn new(z_threshold: f64) -> Self {
        Self {
            tester: CointegrationTester::default(),
            spread_engine: SpreadEngine::new(z_threshold),
            z_threshold,
            min_history_points: DEFAULT_MIN_HISTORY_POINTS,
        }
    }

    /// Examine every unordered pair of markets with enough history.
    ///
    /// Returns opportunities sorted by confidence, highest first. Pairs that
    /// are not cointegrated or whose spread sits inside the threshold band
    /// are skipped, never errors.
    pub fn scan(&self, markets: &[MarketSnapshot]) -> Vec<ArbitrageOpportunity> {
        let eligible: Vec<&MarketSnapshot> = markets
            .iter()
            .filter(|m| m.price_history.len() >= self.min_history_points)
            .collect();
        if eligible.len() < markets.len() {
            debug!(
                skipped = markets.len() - eligible.len(),
                required = self.min_history_points,
                "markets skipped for short price history"
            );
        }

        let mut opportunities = Vec::new();
        for i in 0..eligible.len() {
            for j in (i + 1)..eligible.len() {
                if let Some(opp) = self.evaluate_pair(eligible[i], eligible[j]) {
                    opportunities.push(opp);
                }
            }
        }

        opportunities.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        if !opportunities.is_empty() {
            info!(
                count = opportunities.len(),
                best_z = opportunities[0].z_score,
                "arbitrage opportunities found"
            );
        }
        crate::metrics::record_opportunities_found(opportunities.len());
        opportunities
    }

    fn evaluate_pair(
        &self,
        m1: &MarketSnapshot,
        m2: &MarketSnapshot,
    ) -> Option<ArbitrageOpportunity> {
        let cointegration = self.tester.test(&m1.price_history, &m2.price_history);
        if !cointegration.is_cointegrated {
            return None;
        }

        let spread = self
            .spread_engine
            .calculate(&m1.price_history, &m2.price_history);
        let z = spread.z_score;

        let signal = if z > self.z_threshold {
            SpreadSignal::ShortSpread
        } else if z < -self.z_threshold {
            SpreadSignal::LongSpread
        } else {
            return None;
        };

        let confidence = (z.abs() / 3.0).min(1.0);
        Some(ArbitrageOpportunity {
            market_id_1: m1.id.clone(),
            market_id_2: m2.id.clone(),
            signal,
            z_score: z,
            confidence,
            expected_return: z.abs() * 0.01,
            suggested_position_size: (confidence * z.abs() / 4.0).min(1.0),
            cointegration,
            spread,
        })
    }

    /// Gate an opportunity against the caller's risk tolerance.
    pub fn should_execute(
        &self,
        opportunity: &ArbitrageOpportunity,
        risk_tolerance: f64,
    ) -> ExecutionDecision {
        if opportunity.confidence < risk_tolerance {
            return ExecutionDecision {
                execute: false,
                reason: format!(
                    "confidence {:.3} below tolerance {:.3}",
                    opportunity.confidence, risk_tolerance
                ),
            };
        }
        if opportunity.z_score.abs() < self.z_threshold {
            return ExecutionDecision {
                execute: false,
                reason: format!(
                    "|z| {:.3} inside threshold {:.3}",
                    opportunity.z_score.abs(),
                    self.z_threshold
                ),
            };
        }
        ExecutionDecision {
            execute: true,
            reason: format!(
                "{} at z={:.2} confidence={:.2}",
                opportunity.signal, opportunity.z_score, opportunity.confidence
            ),
        }
    }
}
