// handlers/mod.rs - route handlers grouped by resource
//
// Public:  GET /, GET /health, GET /api/products[/:id],
//          POST /api/users/register, POST /api/users/login
// User:    GET /api/users/me
// Admin:   POST /api/products, PUT|DELETE /api/products/:id

pub mod products;
pub mod users;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET / - liveness banner
pub async fn root() -> &'static str {
    "E-commerce API is running..."
}

/// GET /health - reports whether the store answers
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.products.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "version": env!("CARGO_PKG_VERSION"),
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "version": env!("CARGO_PKG_VERSION"),
                    "store": "unavailable"
                })),
            )
        }
    }
}
