//! HTTP request handlers for the Circulate API
//!
//! Each handler is a thin adapter: extract the request, call one
//! [`Selector`] operation, record metrics, serialise the result.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::{RequestId, request_id_middleware};
use crate::selector::{Selector, SelectorState};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod endpoints;
pub mod health;
pub mod metrics;
pub mod policy;
pub mod select;

/// Application state shared across all handlers
///
/// This is the single owner of the process-wide selector; handlers reach it
/// only through `State<AppState>`. All fields are Arc'd for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    selector: Arc<Selector>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured pool contains a blank identifier or
    /// metrics registration fails.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let pool = SelectorState::new(config.pool.endpoint_ids()?, config.pool.policy);
        let pool_size = pool.len();
        let selector = Arc::new(Selector::from_state(pool));

        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to register metrics: {}", e)))?;
        metrics.set_pool_size(pool_size);

        Ok(Self {
            config,
            selector,
            metrics: Arc::new(metrics),
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the selector
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get reference to the metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/get_ip", get(select::handler))
        .route("/api/set_algorithm/{algorithm}", get(policy::handler))
        .route("/api/add_ip", post(endpoints::add_handler))
        .route("/api/stats", get(endpoints::stats_handler))
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Log-and-continue on metrics recording errors; metrics never fail a request
fn log_metrics_error(
    result: Result<(), prometheus::Error>,
    request_id: RequestId,
    operation: &'static str,
) {
    if let Err(e) = result {
        tracing::error!(
            request_id = %request_id,
            error = %e,
            operation,
            "Metrics recording failed (non-fatal)"
        );
    }
}
