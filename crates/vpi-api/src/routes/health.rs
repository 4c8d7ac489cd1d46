//! # Health Probe
//!
//! `GET /health` pings the user store. Unauthenticated and side-effect free.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Health probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// `connected` or `unreachable`.
    pub database: String,
}

impl HealthResponse {
    fn healthy() -> Self {
        Self {
            status: "healthy".into(),
            database: "connected".into(),
        }
    }

    fn unhealthy() -> Self {
        Self {
            status: "unhealthy".into(),
            database: "unreachable".into(),
        }
    }
}

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health — Store connectivity check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse),
    ),
    tag = "health"
)]
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.users.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy())),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy()),
            )
        }
    }
}
