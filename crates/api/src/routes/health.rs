use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::Value;
use tracing::error;

use crate::state::AppState;

/// Create health router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check endpoint: verifies the database answers a round trip.
async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(serde_json::json!({
        "is_ready": true,
        "timestamp": chrono::Utc::now()
    })))
}
