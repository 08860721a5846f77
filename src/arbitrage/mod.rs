//! Statistical arbitrage: spread analysis and pairwise market scanning.

pub mod scanner;
pub mod spread;

pub use scanner::{
    ArbitrageOpportunity, ArbitrageScanner, ExecutionDecision, SpreadSignal,
    DEFAULT_RISK_TOLERANCE,
};
pub use spread::{SpreadEngine, SpreadResult};
