//! Position sizing, portfolio bookkeeping and stop-loss enforcement.

pub mod kelly;
pub mod performance;
pub mod portfolio;

pub use kelly::{KellySizer, DEFAULT_WIN_LOSS_RATIO};
pub use performance::{performance_from_returns, PerformanceReport};
pub use portfolio::{
    CloseReason, PortfolioState, PortfolioStatus, Position, PositionCloseEvent, PositionSide,
};
