//! Aggregation of scored news articles into a trade decision.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::stats;

/// Articles needed before volume weighting saturates.
const FULL_VOLUME_ARTICLES: f64 = 10.0;
/// Polarity inside this band counts as neutral.
const NEUTRAL_BAND: f64 = 0.1;

/// A news article with a sentiment polarity in [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub headline: String,
    pub source: String,
    pub polarity: f64,
}

impl ScoredArticle {
    pub fn new(headline: impl Into<String>, source: impl Into<String>, polarity: f64) -> Self {
        Self {
            headline: headline.into(),
            source: source.into(),
            polarity: polarity.clamp(-1.0, 1.0),
        }
    }
}

/// Aggregate view across a batch of scored articles.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentSummary {
    /// Mean polarity across the batch.
    pub sentiment_score: f64,
    /// 1 / (1 + polarity variance): unanimous coverage scores 1.
    pub agreement: f64,
    /// min(articles / 10, 1): thin coverage is discounted.
    pub volume: f64,
    /// agreement * volume.
    pub confidence: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub article_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SentimentDirection {
    Long,
    Short,
}

/// Whether the aggregated sentiment justifies a trade.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentDecision {
    pub should_trade: bool,
    pub direction: Option<SentimentDirection>,
    pub confidence: f64,
    pub sentiment_score: f64,
    pub reason: String,
}

/// Aggregates article polarities and applies the trade gate.
#[derive(Debug, Clone)]
pub struct SentimentAggregator {
    sentiment_threshold: f64,
}

impl SentimentAggregator {
    pub fn new(sentiment_threshold: f64) -> Self {
        Self { sentiment_threshold }
    }

    /// Summarize a batch of articles. An empty batch is all zeros.
    pub fn summarize(&self, articles: &[ScoredArticle]) -> SentimentSummary {
        if articles.is_empty() {
            return SentimentSummary {
                sentiment_score: 0.0,
                agreement: 0.0,
                volume: 0.0,
                confidence: 0.0,
                positive_count: 0,
                negative_count: 0,
                neutral_count: 0,
                article_count: 0,
            };
        }

        let polarities: Vec<f64> = articles.iter().map(|a| a.polarity).collect();
        let sentiment_score = stats::mean(&polarities);
        let std = stats::std_dev(&polarities);
        let agreement = 1.0 / (1.0 + std * std);
        let volume = (articles.len() as f64 / FULL_VOLUME_ARTICLES).min(1.0);

        let positive = polarities.iter().filter(|p| **p > NEUTRAL_BAND).count();
        let negative = polarities.iter().filter(|p| **p < -NEUTRAL_BAND).count();

        SentimentSummary {
            sentiment_score,
            agreement,
            volume,
            confidence: agreement * volume,
            positive_count: positive,
            negative_count: negative,
            neutral_count: articles.len() - positive - negative,
            article_count: articles.len(),
        }
    }

    /// Gate a summary into a trade decision.
    ///
    /// Confidence under 0.3 always rejects. Otherwise a trade requires the
    /// mean sentiment to clear the threshold and confidence to clear 0.5.
    pub fn decide(&self, summary: &SentimentSummary) -> SentimentDecision {
        if summary.confidence < 0.3 {
            return SentimentDecision {
                should_trade: false,
                direction: None,
                confidence: summary.confidence,
                sentiment_score: summary.sentiment_score,
                reason: format!("confidence {:.3} below floor 0.3", summary.confidence),
            };
        }

        let strong = summary.sentiment_score.abs() > self.sentiment_threshold;
        if strong && summary.confidence > 0.5 {
            let direction = if summary.sentiment_score > 0.0 {
                SentimentDirection::Long
            } else {
                SentimentDirection::Short
            };
            debug!(
                sentiment = summary.sentiment_score,
                confidence = summary.confidence,
                %direction,
                "sentiment trade gate passed"
            );
            return SentimentDecision {
                should_trade: true,
                direction: Some(direction),
                confidence: summary.confidence,
                sentiment_score: summary.sentiment_score,
                reason: format!(
                    "{} sentiment {:.2} over threshold {:.2}",
                    direction, summary.sentiment_score, self.sentiment_threshold
                ),
            };
        }

        SentimentDecision {
            should_trade: false,
            direction: None,
            confidence: summary.confidence,
            sentiment_score: summary.sentiment_score,
            reason: if strong {
                format!("confidence {:.3} not above 0.5", summary.confidence)
            } else {
                format!(
                    "sentiment {:.3} inside threshold {:.3}",
                    summary.sentiment_score, self.sentiment_threshold
                )
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(polarities: &[f64]) -> Vec<ScoredArticle> {
        polarities
            .iter()
            .enumerate()
            .map(|(i, p)| ScoredArticle::new(format!("headline {i}"), "wire", *p))
            .collect()
    }

    #[test]
    fn unanimous_batch_has_full_agreement() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[0.8; 10]));

        assert!((summary.sentiment_score - 0.8).abs() < 1e-12);
        assert!((summary.agreement - 1.0).abs() < 1e-12);
        assert_eq!(summary.volume, 1.0);
        assert!((summary.confidence - 1.0).abs() < 1e-12);
        assert_eq!(summary.positive_count, 10);
        assert_eq!(summary.neutral_count, 0);
    }

    #[test]
    fn disagreement_shrinks_confidence() {
        let aggregator = SentimentAggregator::new(0.6);
        let mixed = aggregator.summarize(&batch(&[0.9, -0.9, 0.9, -0.9, 0.9, -0.9, 0.9, -0.9, 0.9, -0.9]));
        let aligned = aggregator.summarize(&batch(&[0.9; 10]));
        assert!(mixed.confidence < aligned.confidence);
        assert!(mixed.agreement < 0.6);
    }

    #[test]
    fn thin_coverage_is_discounted() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[0.8, 0.8, 0.8]));
        assert!((summary.volume - 0.3).abs() < 1e-12);
        assert!((summary.confidence - 0.3).abs() < 1e-12);
    }

    #[test]
    fn neutral_band_counts() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[0.05, -0.08, 0.1, 0.4, -0.5]));
        assert_eq!(summary.neutral_count, 3);
        assert_eq!(summary.positive_count, 1);
        assert_eq!(summary.negative_count, 1);
    }

    #[test]
    fn strong_unanimous_sentiment_trades_long() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[0.8; 10]));
        let decision = aggregator.decide(&summary);
        assert!(decision.should_trade);
        assert_eq!(decision.direction, Some(SentimentDirection::Long));
    }

    #[test]
    fn strong_negative_sentiment_trades_short() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[-0.85; 10]));
        let decision = aggregator.decide(&summary);
        assert!(decision.should_trade);
        assert_eq!(decision.direction, Some(SentimentDirection::Short));
    }

    #[test]
    fn low_confidence_always_rejects() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[0.9, 0.9]));
        let decision = aggregator.decide(&summary);
        assert!(!decision.should_trade);
        assert!(decision.reason.contains("below floor"));
    }

    #[test]
    fn weak_sentiment_rejects_even_with_confidence() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&batch(&[0.3; 10]));
        let decision = aggregator.decide(&summary);
        assert!(!decision.should_trade);
        assert!(decision.reason.contains("inside threshold"));
    }

    #[test]
    fn empty_batch_is_inert() {
        let aggregator = SentimentAggregator::new(0.6);
        let summary = aggregator.summarize(&[]);
        assert_eq!(summary.confidence, 0.0);
        assert!(!aggregator.decide(&summary).should_trade);
    }
}
