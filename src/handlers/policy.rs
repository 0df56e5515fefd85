//! Policy switching handler
//!
//! `GET /api/set_algorithm/{algorithm}` with one of `round_robin`, `random`,
//! `least_connections`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use super::log_metrics_error;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::selector::Policy;

/// Policy change response
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub success: bool,
    /// Policy now in effect (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    /// Reason for failure (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Switch the active selection policy
///
/// # Response
///
/// - `200 OK` `{ "success": true, "policy": "<name>" }`
/// - `400 Bad Request` `{ "success": false, "message": "..." }` for an unknown
///   name; the previous policy stays active
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(algorithm): Path<String>,
) -> (StatusCode, Json<PolicyResponse>) {
    match state.selector().set_policy(&algorithm).await {
        Ok(change) => {
            log_metrics_error(
                state.metrics().record_policy_change(change.current),
                request_id,
                "record_policy_change",
            );

            tracing::info!(
                request_id = %request_id,
                previous = %change.previous,
                current = %change.current,
                "Policy switched via API"
            );

            (
                StatusCode::OK,
                Json(PolicyResponse {
                    success: true,
                    policy: Some(change.current),
                    message: None,
                }),
            )
        }
        Err(e) => {
            log_metrics_error(
                state.metrics().record_rejection(&e),
                request_id,
                "record_rejection",
            );

            (
                e.status_code(),
                Json(PolicyResponse {
                    success: false,
                    policy: None,
                    message: Some(e.to_string()),
                }),
            )
        }
    }
}
