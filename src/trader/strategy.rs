//! Trading strategies evaluated by the decision arbiter.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use crate::arbitrage::{ArbitrageScanner, SpreadSignal, DEFAULT_RISK_TOLERANCE};
use crate::error::BotError;
use crate::market::MarketSnapshot;
use crate::news::{ScoredArticle, SentimentAggregator, SentimentDirection};
use crate::settings::Settings;
use crate::volatility::{
    GarchModel, RegimeClassifier, VolatilityEstimator, VolatilityRegime,
    VolatilitySignalGenerator, VolatilitySignalKind,
};

use super::arbiter::TradeSide;

/// Inputs shared by every strategy in one cycle.
pub struct StrategyContext<'a> {
    pub markets: &'a [MarketSnapshot],
    pub settings: &'a Settings,
}

/// Strategy-specific diagnostics attached to a signal.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalDetail {
    NewsSentiment {
        sentiment_score: f64,
        article_count: usize,
    },
    Arbitrage {
        paired_market: String,
        z_score: f64,
        spread_signal: SpreadSignal,
    },
    Volatility {
        signal: VolatilitySignalKind,
        regime: VolatilityRegime,
        volatility: f64,
        /// Annualized one-step GARCH(1,1) forecast, when the fit succeeded.
        garch_forecast: Option<f64>,
        /// GARCH alpha + beta, when the fit succeeded.
        garch_persistence: Option<f64>,
    },
}

/// A strategy's vote: trade this market, this way, with this confidence.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySignal {
    pub market_id: String,
    pub side: TradeSide,
    pub confidence: f64,
    pub detail: SignalDetail,
}

/// One evaluable trading strategy.
///
/// `evaluate` is total over its declared inputs: a strategy that cannot
/// produce a signal returns `Ok(None)`. Errors are caught by the arbiter and
/// treated as no signal.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn enabled(&self, settings: &Settings) -> bool;
    fn evaluate(&self, ctx: &StrategyContext) -> Result<Option<StrategySignal>, BotError>;
}

/// Supplier of pre-scored articles for a market.
///
/// Text scoring happens outside this crate; implementations hand back
/// already-scored polarities.
pub trait ArticleSource: Send + Sync {
    fn articles_for(&self, market: &MarketSnapshot) -> Vec<ScoredArticle>;
}

/// Article source backed by a per-market map, for tests and dry runs.
#[derive(Debug, Default)]
pub struct StaticArticleSource {
    by_market: Mutex<HashMap<String, Vec<ScoredArticle>>>,
}

impl StaticArticleSource {
    pub fn set_articles(&self, market_id: &str, articles: Vec<ScoredArticle>) {
        self.lock().insert(market_id.to_string(), articles);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<ScoredArticle>>> {
        self.by_market.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ArticleSource for StaticArticleSource {
    fn articles_for(&self, market: &MarketSnapshot) -> Vec<ScoredArticle> {
        self.lock().get(&market.id).cloned().unwrap_or_default()
    }
}

/// Highest-priority strategy: trade on aggregated news sentiment.
pub struct NewsSentimentStrategy<A: ArticleSource> {
    source: A,
}

impl<A: ArticleSource> NewsSentimentStrategy<A> {
    pub fn new(source: A) -> Self {
        Self { source }
    }
}

impl<A: ArticleSource> Strategy for NewsSentimentStrategy<A> {
    fn name(&self) -> &'static str {
        "news_sentiment"
    }

    fn enabled(&self, settings: &Settings) -> bool {
        settings.news_sentiment_enabled
    }

    fn evaluate(&self, ctx: &StrategyContext) -> Result<Option<StrategySignal>, BotError> {
        let aggregator = SentimentAggregator::new(ctx.settings.news_sentiment_threshold);
        for market in ctx.markets {
            let articles = self.source.articles_for(market);
            let summary = aggregator.summarize(&articles);
            let decision = aggregator.decide(&summary);
            if !decision.should_trade {
                continue;
            }
            let side = match decision.direction {
                Some(SentimentDirection::Long) => TradeSide::Buy,
                Some(SentimentDirection::Short) => TradeSide::Sell,
                None => continue,
            };
            return Ok(Some(StrategySignal {
                market_id: market.id.clone(),
                side,
                confidence: decision.confidence,
                detail: SignalDetail::NewsSentiment {
                    sentiment_score: decision.sentiment_score,
                    article_count: summary.article_count,
                },
            }));
        }
        Ok(None)
    }
}

/// Second priority: cointegration spread dislocations.
#[derive(Debug, Default)]
pub struct StatArbitrageStrategy;

impl Strategy for StatArbitrageStrategy {
    fn name(&self) -> &'static str {
        "statistical_arbitrage"
    }

    fn enabled(&self, settings: &Settings) -> bool {
        settings.statistical_arbitrage_enabled
    }

    fn evaluate(&self, ctx: &StrategyContext) -> Result<Option<StrategySignal>, BotError> {
        let scanner = ArbitrageScanner::new(ctx.settings.stat_arbitrage_threshold);
        for opportunity in scanner.scan(ctx.markets) {
            let gate = scanner.should_execute(&opportunity, DEFAULT_RISK_TOLERANCE);
            if !gate.execute {
                debug!(
                    market = %opportunity.market_id_1,
                    reason = %gate.reason,
                    "arbitrage opportunity gated out"
                );
                continue;
            }
            // Trade the first leg; SHORT_SPREAD sells the rich leg.
            let side = match opportunity.signal {
                SpreadSignal::ShortSpread => TradeSide::Sell,
                SpreadSignal::LongSpread => TradeSide::Buy,
            };
            return Ok(Some(StrategySignal {
                market_id: opportunity.market_id_1.clone(),
                side,
                confidence: opportunity.confidence,
                detail: SignalDetail::Arbitrage {
                    paired_market: opportunity.market_id_2.clone(),
                    z_score: opportunity.z_score,
                    spread_signal: opportunity.signal,
                },
            }));
        }
        Ok(None)
    }
}

/// Lowest priority: volatility regime signals.
///
/// Each market is assessed against its own history: the regime classifier is
/// seeded with rolling volatilities derived from that market's past prices,
/// so readings from one market never color another's summary. A GARCH(1,1)
/// fit over the same history rides along in the signal detail when enough
/// observations exist.
#[derive(Debug, Default)]
pub struct VolatilityStrategy;

impl Strategy for VolatilityStrategy {
    fn name(&self) -> &'static str {
        "volatility_based"
    }

    fn enabled(&self, settings: &Settings) -> bool {
        settings.volatility_based_enabled
    }

    fn evaluate(&self, ctx: &StrategyContext) -> Result<Option<StrategySignal>, BotError> {
        let window = ctx.settings.volatility_window;
        let estimator = VolatilityEstimator::new(window);
        let generator = VolatilitySignalGenerator;

        for market in ctx.markets {
            let prices = &market.price_history;
            let metrics = estimator.estimate(prices);
            if metrics.failure.is_some() {
                continue;
            }

            // Volatility history from this market's own earlier windows; the
            // current reading is classified against it.
            let mut classifier = RegimeClassifier::new();
            for end in window..prices.len() - 1 {
                let past = estimator.estimate(&prices[..=end]);
                if past.failure.is_none() {
                    classifier.record(past.historical);
                }
            }
            let assessment = classifier.classify(metrics.historical);

            let Some(signal) = generator.generate(&assessment, prices) else {
                continue;
            };
            if signal.confidence < ctx.settings.volatility_threshold {
                continue;
            }
            let side = match signal.kind {
                VolatilitySignalKind::MeanReversionShort => TradeSide::Sell,
                VolatilitySignalKind::MeanReversionLong => TradeSide::Buy,
                // No direction until the breakout resolves.
                VolatilitySignalKind::BreakoutSetup => continue,
            };
            let garch = GarchModel.fit(prices).ok();
            return Ok(Some(StrategySignal {
                market_id: market.id.clone(),
                side,
                confidence: signal.confidence,
                detail: SignalDetail::Volatility {
                    signal: signal.kind,
                    regime: signal.regime,
                    volatility: metrics.historical,
                    garch_forecast: garch.as_ref().map(|g| g.forecast_volatility),
                    garch_persistence: garch.map(|g| g.persistence),
                },
            }));
        }
        Ok(None)
    }
}
