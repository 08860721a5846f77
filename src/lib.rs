//! Multi-strategy statistical trading bot for Kalshi event markets.
//!
//! Three strategies feed a priority-ordered decision arbiter each cycle:
//!
//! 1. News sentiment — aggregated article polarities per market.
//! 2. Statistical arbitrage — cointegrated market pairs whose spread
//!    z-score leaves its normal band.
//! 3. Volatility — regime classification (historical + GARCH estimates)
//!    with mean-reversion and breakout signals.
//!
//! The first strategy that fires wins the cycle; its confidence runs through
//! Kelly sizing and the resulting order lands in a mutex-guarded portfolio.
//! A separate market-data refresh task sweeps open positions against
//! stop-loss thresholds on every price tick.
//!
//! # Modules
//!
//! - [`config`]: Process configuration from environment
//! - [`settings`]: Runtime-adjustable trading settings
//! - [`error`]: Unified error types
//! - [`stats`]: OLS, ADF and cointegration primitives
//! - [`arbitrage`]: Spread engine and pairwise scanner
//! - [`volatility`]: Volatility estimation, GARCH, regimes, signals
//! - [`news`]: Sentiment aggregation and trade gating
//! - [`risk`]: Kelly sizing, portfolio state, performance metrics
//! - [`trader`]: Strategies, decision arbiter, engine loop
//! - [`market`]: Kalshi client, rolling price book, mock source
//! - [`notifier`]: Trade/close event delivery seam
//! - [`metrics`]: Prometheus counters and histograms
//! - [`api`]: HTTP API for health/status/settings

pub mod api;
pub mod arbitrage;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod news;
pub mod notifier;
pub mod risk;
pub mod settings;
pub mod stats;
pub mod trader;
pub mod volatility;

pub use config::Config;
pub use error::{BotError, Result};
