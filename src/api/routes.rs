//! HTTP API route definitions.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{get_settings, health, portfolio, put_settings, ready, status, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Status, portfolio and settings
        .route("/api/v1/status", get(status))
        .route("/api/v1/portfolio", get(portfolio))
        .route("/api/v1/settings", get(get_settings))
        .route("/api/v1/settings", put(put_settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::PortfolioState;
    use crate::settings::SettingsManager;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state(tag: &str) -> AppState {
        let path = std::env::temp_dir()
            .join(format!("kalshi-quant-api-{tag}-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        AppState::new(
            Arc::new(PortfolioState::new(dec!(10000))),
            Arc::new(SettingsManager::load(path).unwrap()),
        )
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(state("health"));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_503_until_ready() {
        let state = state("ready");
        let app = create_router(state.clone());
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.set_ready(true);
        let app = create_router(state);
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn status_endpoint_summarizes_the_bot() {
        let state = state("status");
        state.set_ready(true);
        let app = create_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["ready"], true);
        assert_eq!(json["bankroll"], "10000");
        assert_eq!(json["open_positions"], 0);
    }

    #[tokio::test]
    async fn portfolio_endpoint_reports_bankroll() {
        let app = create_router(state("portfolio"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/portfolio")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["bankroll"], "10000");
        assert_eq!(json["closed_trades"], 0);
    }

    #[tokio::test]
    async fn settings_roundtrip_through_the_api() {
        let state = state("settings");
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/v1/settings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"stat_arbitrage_threshold": 2.5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.settings.snapshot().stat_arbitrage_threshold, 2.5);
    }

    #[tokio::test]
    async fn invalid_settings_update_is_rejected() {
        let state = state("invalid");
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/v1/settings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"stop_loss_pct": "0.9"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.settings.snapshot().stop_loss_pct, dec!(0.05));
    }
}
