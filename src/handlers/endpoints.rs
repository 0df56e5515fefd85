//! Endpoint pool handlers
//!
//! - `POST /api/add_ip` with body `{ "ip": "<identifier>" }`
//! - `GET /api/stats`

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::log_metrics_error;
use crate::error::SelectorError;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::selector::{AddOutcome, EndpointAdded, Policy, Stats};

/// Add-endpoint request body
///
/// `ip` is optional at the serde level so a missing field produces the same
/// structured failure as an empty one rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct AddEndpointRequest {
    #[serde(default)]
    pub ip: Option<String>,
}

/// Add-endpoint response
#[derive(Debug, Serialize)]
pub struct AddEndpointResponse {
    pub success: bool,
    pub message: String,
}

/// Counter snapshot response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub policy: Policy,
    pub stats: Stats,
}

/// Add an endpoint to the pool
///
/// # Response
///
/// - `200 OK` `{ "success": true, "message": "Added <ip>" }`, also when the
///   endpoint was already present
/// - `400 Bad Request` `{ "success": false, "message": "Invalid IP" }` when
///   `ip` is missing, empty, blank or not a string, or the body is not JSON
pub async fn add_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AddEndpointRequest>, JsonRejection>,
) -> (StatusCode, Json<AddEndpointResponse>) {
    let ip = match payload {
        Ok(Json(request)) => request.ip.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(
                request_id = %request_id,
                rejection = %rejection.body_text(),
                "Unreadable add endpoint payload"
            );
            String::new()
        }
    };

    match state.selector().add_endpoint(&ip).await {
        Ok(EndpointAdded { outcome, pool_size }) => {
            state.metrics().set_pool_size(pool_size);

            tracing::info!(
                request_id = %request_id,
                endpoint = %ip,
                outcome = ?outcome,
                "Add endpoint request handled"
            );

            let message = match outcome {
                AddOutcome::Added => format!("Added {}", ip),
                AddOutcome::AlreadyPresent => format!("{} is already in the pool", ip),
            };

            (
                StatusCode::OK,
                Json(AddEndpointResponse {
                    success: true,
                    message,
                }),
            )
        }
        Err(e) => {
            log_metrics_error(
                state.metrics().record_rejection(&e),
                request_id,
                "record_rejection",
            );

            tracing::warn!(
                request_id = %request_id,
                error = %e,
                "Rejected add endpoint request"
            );

            let message = match &e {
                SelectorError::InvalidEndpoint => "Invalid IP".to_string(),
                other => other.to_string(),
            };

            (
                e.status_code(),
                Json(AddEndpointResponse {
                    success: false,
                    message,
                }),
            )
        }
    }
}

/// Return the active policy and a snapshot of all counters
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let (policy, stats) = state.selector().snapshot().await;
    Json(StatsResponse { policy, stats })
}
