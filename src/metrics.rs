//! Prometheus metrics for the trading loop.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Instant;
use tracing::debug;

use crate::risk::CloseReason;

// === Metric Name Constants ===

/// Decision cycle duration metric name.
pub const METRIC_CYCLE_DURATION: &str = "decision_cycle_duration_ms";
/// Decision cycles completed counter metric name.
pub const METRIC_CYCLES_COMPLETED: &str = "decision_cycles_total";
/// Trades executed counter metric name.
pub const METRIC_TRADES_EXECUTED: &str = "trades_executed_total";
/// Strategy failures counter metric name.
pub const METRIC_STRATEGY_FAILURES: &str = "strategy_failures_total";
/// Arbitrage opportunities found counter metric name.
pub const METRIC_OPPORTUNITIES_FOUND: &str = "arbitrage_opportunities_total";
/// Positions closed counter metric name.
pub const METRIC_POSITIONS_CLOSED: &str = "positions_closed_total";
/// Tracked markets gauge metric name.
pub const METRIC_TRACKED_MARKETS: &str = "tracked_markets";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_CYCLE_DURATION,
        "Decision cycle duration in milliseconds"
    );
    describe_counter!(
        METRIC_CYCLES_COMPLETED,
        "Total number of completed decision cycles"
    );
    describe_counter!(METRIC_TRADES_EXECUTED, "Total number of trades executed");
    describe_counter!(
        METRIC_STRATEGY_FAILURES,
        "Total number of strategy evaluation failures"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_FOUND,
        "Total number of arbitrage opportunities found"
    );
    describe_counter!(
        METRIC_POSITIONS_CLOSED,
        "Total number of positions closed, by reason"
    );
    describe_gauge!(METRIC_TRACKED_MARKETS, "Markets currently tracked");

    debug!("Metrics initialized");
}

/// Record the duration of one decision cycle.
pub fn record_cycle_duration(start: Instant) {
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_CYCLE_DURATION).record(elapsed_ms);
    counter!(METRIC_CYCLES_COMPLETED).increment(1);
}

/// Increment the executed-trades counter for a strategy.
pub fn inc_trades_executed(strategy: &str) {
    counter!(METRIC_TRADES_EXECUTED, "strategy" => strategy.to_string()).increment(1);
}

/// Increment the strategy-failure counter.
pub fn inc_strategy_failures(strategy: &str) {
    counter!(METRIC_STRATEGY_FAILURES, "strategy" => strategy.to_string()).increment(1);
}

/// Record how many opportunities the latest scan produced.
pub fn record_opportunities_found(count: usize) {
    if count > 0 {
        counter!(METRIC_OPPORTUNITIES_FOUND).increment(count as u64);
    }
}

/// Count a position closure by reason.
pub fn record_position_closed(reason: &CloseReason) {
    counter!(METRIC_POSITIONS_CLOSED, "reason" => reason.to_string()).increment(1);
}

/// Update the tracked-markets gauge.
pub fn record_tracked_markets(count: usize) {
    gauge!(METRIC_TRACKED_MARKETS).set(count as f64);
}
