//! Health check endpoint
//!
//! Provides a simple liveness check for monitoring.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Number of endpoints in the pool
    pub endpoints: usize,
}

/// Health check handler
///
/// Always returns 200 OK; the endpoint count is informational.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            endpoints: state.selector().len().await,
        }),
    )
}
