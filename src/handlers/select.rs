//! Endpoint selection handler
//!
//! `GET /api/get_ip` → `{ "ip": "...", "endpoint": "...", "message": "circulate", "policy": "...", "stats": { ... } }`

use axum::{Extension, Json, extract::State};
use serde::Serialize;

use super::log_metrics_error;
use crate::error::AppError;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::selector::{EndpointId, Policy, Selection, Stats};

/// Service tag carried in every selection response
pub const SERVICE_MESSAGE: &str = "circulate";

/// Selection response
///
/// `ip` and `message` are the fields the dashboard reads; `endpoint` carries
/// the same identifier under its pool name.
#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub ip: EndpointId,
    pub endpoint: EndpointId,
    pub message: &'static str,
    pub policy: Policy,
    pub stats: Stats,
}

impl From<Selection> for SelectResponse {
    fn from(selection: Selection) -> Self {
        Self {
            ip: selection.endpoint.clone(),
            endpoint: selection.endpoint,
            message: SERVICE_MESSAGE,
            policy: selection.policy,
            stats: selection.stats,
        }
    }
}

/// Select one endpoint under the active policy
///
/// # Response
///
/// - `200 OK` with the chosen endpoint, the policy that chose it, and all counters
/// - `503 Service Unavailable` if the pool is empty
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<SelectResponse>, AppError> {
    let selection = match state.selector().select().await {
        Ok(selection) => selection,
        Err(e) => {
            log_metrics_error(
                state.metrics().record_rejection(&e),
                request_id,
                "record_rejection",
            );
            return Err(e.into());
        }
    };

    log_metrics_error(
        state.metrics().record_selection(selection.policy),
        request_id,
        "record_selection",
    );

    tracing::info!(
        request_id = %request_id,
        endpoint = %selection.endpoint,
        policy = %selection.policy,
        "Endpoint selected"
    );

    Ok(Json(SelectResponse::from(selection)))
}
