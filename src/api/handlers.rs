//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::risk::{performance_from_returns, PerformanceReport, PortfolioState, Position};
use crate::settings::{Settings, SettingsManager, SettingsUpdate};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Whether the bot is ready to trade.
    ready: Arc<AtomicBool>,
    /// Shared position book and bankroll.
    pub portfolio: Arc<PortfolioState>,
    /// Runtime settings manager.
    pub settings: Arc<SettingsManager>,
}

impl AppState {
    pub fn new(portfolio: Arc<PortfolioState>, settings: Arc<SettingsManager>) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            portfolio,
            settings,
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

/// Compact bot status summary.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub bankroll: String,
    pub open_positions: usize,
    pub closed_trades: usize,
}

/// Portfolio response with derived risk metrics.
#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub bankroll: String,
    pub initial_bankroll: String,
    pub realized_pnl: String,
    pub total_return_pct: f64,
    pub open_positions: Vec<Position>,
    pub closed_trades: usize,
    pub win_rate: f64,
    pub risk_metrics: PerformanceReport,
}

/// Error body for rejected settings updates.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse { ready: is_ready };
    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Compact status: readiness plus headline portfolio numbers.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let portfolio = state.portfolio.status();
    Json(StatusResponse {
        ready: state.is_ready(),
        bankroll: portfolio.bankroll.to_string(),
        open_positions: portfolio.open_positions.len(),
        closed_trades: portfolio.closed_trades,
    })
}

/// Portfolio status with risk metrics.
pub async fn portfolio(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.portfolio.status();

    // Single-period return over the run so far; per-trade series would need
    // a persisted equity history.
    let total_return = if status.initial_bankroll.is_zero() {
        0.0
    } else {
        use rust_decimal::prelude::ToPrimitive;
        (status.realized_pnl / status.initial_bankroll)
            .to_f64()
            .unwrap_or(0.0)
    };
    let risk_metrics = performance_from_returns(&[total_return]);

    Json(PortfolioResponse {
        bankroll: status.bankroll.to_string(),
        initial_bankroll: status.initial_bankroll.to_string(),
        realized_pnl: status.realized_pnl.to_string(),
        total_return_pct: total_return * 100.0,
        open_positions: status.open_positions,
        closed_trades: status.closed_trades,
        win_rate: status.win_rate,
        risk_metrics,
    })
}

/// Current settings snapshot.
pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.snapshot())
}

/// Apply a partial settings update.
pub async fn put_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> impl IntoResponse {
    match state.settings.update(update) {
        Ok(applied) => (StatusCode::OK, Json(applied)).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
