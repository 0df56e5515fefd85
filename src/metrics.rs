//! Prometheus metrics collection for Circulate
//!
//! This module provides metrics instrumentation for tracking:
//! - Selections by policy
//! - Policy changes
//! - Rejected operations by error kind
//! - Current pool size
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use crate::error::SelectorError;
use crate::selector::Policy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector for Circulate
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    selections_total: IntCounterVec,
    policy_changes_total: IntCounterVec,
    rejected_operations_total: IntCounterVec,
    pool_size: IntGauge,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Labelled by policy rather than endpoint: the pool only grows, so an
        // endpoint label would have unbounded cardinality. Per-endpoint counts
        // are served by /api/stats instead.
        let selections_total = IntCounterVec::new(
            Opts::new(
                "circulate_selections_total",
                "Total number of endpoint selections by policy",
            ),
            &["policy"],
        )?;

        let policy_changes_total = IntCounterVec::new(
            Opts::new(
                "circulate_policy_changes_total",
                "Total number of accepted policy changes by the policy switched to",
            ),
            &["policy"],
        )?;

        // reason: invalid_endpoint, unknown_policy, empty_pool
        let rejected_operations_total = IntCounterVec::new(
            Opts::new(
                "circulate_rejected_operations_total",
                "Total number of selector operations rejected, by error kind",
            ),
            &["reason"],
        )?;

        let pool_size = IntGauge::with_opts(Opts::new(
            "circulate_pool_size",
            "Number of endpoints currently in the pool",
        ))?;

        registry.register(Box::new(selections_total.clone()))?;
        registry.register(Box::new(policy_changes_total.clone()))?;
        registry.register(Box::new(rejected_operations_total.clone()))?;
        registry.register(Box::new(pool_size.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            selections_total,
            policy_changes_total,
            rejected_operations_total,
            pool_size,
        })
    }

    /// Record one selection made under `policy`
    ///
    /// # Errors
    ///
    /// Returns an error if the label set does not match the metric definition.
    pub fn record_selection(&self, policy: Policy) -> Result<(), prometheus::Error> {
        self.selections_total
            .get_metric_with_label_values(&[policy.as_str()])?
            .inc();
        Ok(())
    }

    /// Record an accepted switch to `policy`
    ///
    /// # Errors
    ///
    /// Returns an error if the label set does not match the metric definition.
    pub fn record_policy_change(&self, policy: Policy) -> Result<(), prometheus::Error> {
        self.policy_changes_total
            .get_metric_with_label_values(&[policy.as_str()])?
            .inc();
        Ok(())
    }

    /// Record a rejected selector operation
    ///
    /// # Errors
    ///
    /// Returns an error if the label set does not match the metric definition.
    pub fn record_rejection(&self, error: &SelectorError) -> Result<(), prometheus::Error> {
        self.rejected_operations_total
            .get_metric_with_label_values(&[error.kind()])?
            .inc();
        Ok(())
    }

    /// Set the pool size gauge
    pub fn set_pool_size(&self, size: usize) {
        self.pool_size.set(i64::try_from(size).unwrap_or(i64::MAX));
    }

    /// Current value of the selections counter for `policy`
    pub fn selections_count(&self, policy: Policy) -> u64 {
        self.selections_total
            .get_metric_with_label_values(&[policy.as_str()])
            .map(|c| c.get())
            .unwrap_or(0)
    }

    /// Current value of the pool size gauge
    pub fn pool_size(&self) -> i64 {
        self.pool_size.get()
    }

    /// Gather all metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        tracing::debug!(
            metric_family_count = metric_families.len(),
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Metrics output is not valid UTF-8: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new_creates_registry() {
        let metrics = Metrics::new().expect("Failed to create metrics");

        // Vec metrics only appear once a label set has been observed
        metrics.record_selection(Policy::RoundRobin).unwrap();
        metrics.record_policy_change(Policy::Random).unwrap();
        metrics
            .record_rejection(&SelectorError::InvalidEndpoint)
            .unwrap();
        metrics.set_pool_size(5);

        let names: Vec<String> = metrics
            .registry
            .gather()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        assert_eq!(names.len(), 4, "Expected 4 metric families");
        assert!(names.contains(&"circulate_selections_total".to_string()));
        assert!(names.contains(&"circulate_policy_changes_total".to_string()));
        assert!(names.contains(&"circulate_rejected_operations_total".to_string()));
        assert!(names.contains(&"circulate_pool_size".to_string()));
    }

    #[test]
    fn test_record_selection_increments_per_policy() {
        let metrics = Metrics::new().unwrap();

        metrics.record_selection(Policy::RoundRobin).unwrap();
        metrics.record_selection(Policy::RoundRobin).unwrap();
        metrics.record_selection(Policy::LeastConnections).unwrap();

        assert_eq!(metrics.selections_count(Policy::RoundRobin), 2);
        assert_eq!(metrics.selections_count(Policy::LeastConnections), 1);
        assert_eq!(metrics.selections_count(Policy::Random), 0);
    }

    #[test]
    fn test_pool_size_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.set_pool_size(7);
        assert_eq!(metrics.pool_size(), 7);
    }

    #[test]
    fn test_gather_contains_rejection_label() {
        let metrics = Metrics::new().unwrap();
        metrics
            .record_rejection(&SelectorError::UnknownPolicy {
                name: "x".to_string(),
            })
            .unwrap();

        let output = metrics.gather().unwrap();
        assert!(output.contains("circulate_rejected_operations_total{reason=\"unknown_policy\"} 1"));
    }
}
