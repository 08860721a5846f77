//! The trading loop: strategies, decision arbitration, cycle engine.

pub mod arbiter;
pub mod engine;
pub mod strategy;

pub use arbiter::{DecisionArbiter, TradeDecision, TradeSide};
pub use engine::TradingEngine;
pub use strategy::{
    ArticleSource, NewsSentimentStrategy, SignalDetail, StatArbitrageStrategy, StaticArticleSource,
    Strategy, StrategyContext, StrategySignal, VolatilityStrategy,
};
