//! Prometheus metrics endpoint
//!
//! Exposes metrics in Prometheus text format for scraping.

use axum::{extract::State, http::StatusCode};

use crate::handlers::AppState;

/// Metrics handler for Prometheus scraping
///
/// The pool-size gauge is refreshed from the selector before gathering, so a
/// scrape never sees a size left behind by out-of-order add handlers.
///
/// # Response
///
/// - `200 OK` with metrics in Prometheus text format
/// - `500 Internal Server Error` if metrics encoding fails
///
/// # Example
///
/// ```bash
/// curl http://localhost:5000/metrics
/// # HELP circulate_selections_total Total number of endpoint selections by policy
/// # TYPE circulate_selections_total counter
/// circulate_selections_total{policy="round_robin"} 42
/// ```
pub async fn handler(State(state): State<AppState>) -> (StatusCode, String) {
    state.metrics().set_pool_size(state.selector().len().await);

    match state.metrics().gather() {
        Ok(output) => (StatusCode::OK, output),
        Err(e) => {
            tracing::error!(error = %e, "Failed to gather metrics for Prometheus scraping");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::selector::Policy;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_metrics_handler_returns_prometheus_format() {
        let state = AppState::new(Arc::new(Config::default())).unwrap();
        state
            .metrics()
            .record_selection(Policy::RoundRobin)
            .unwrap();

        let (status, body) = handler(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("# TYPE circulate_selections_total counter"));
        assert!(body.contains("circulate_selections_total{policy=\"round_robin\"} 1"));
        assert!(body.contains("circulate_pool_size 5"));
    }

    #[tokio::test]
    async fn test_metrics_handler_refreshes_stale_pool_size() {
        let state = AppState::new(Arc::new(Config::default())).unwrap();
        state.selector().add_endpoint("10.3.0.1").await.unwrap();
        state.metrics().set_pool_size(1);

        let (_, body) = handler(State(state)).await;

        assert!(body.contains("circulate_pool_size 6"));
    }
}
