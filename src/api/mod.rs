//! HTTP API for health, status and settings.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
