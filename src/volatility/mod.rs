//! Volatility estimation, regime classification and signal generation.

pub mod estimator;
pub mod garch;
pub mod regime;
pub mod signal;

pub use estimator::{VolatilityEstimator, VolatilityMetrics, DEFAULT_VOLATILITY_WINDOW};
pub use garch::{GarchFit, GarchModel};
pub use regime::{RegimeAssessment, RegimeClassifier, VolatilityRegime};
pub use signal::{PriceTrend, VolatilitySignal, VolatilitySignalGenerator, VolatilitySignalKind};

/// Trading days per year, used to annualize per-step volatility.
pub const TRADING_DAYS: f64 = 252.0;
