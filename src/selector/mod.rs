//! Backend selection engine
//!
//! The [`Selector`] owns the endpoint pool, per-endpoint selection counters,
//! the round-robin cursor and the active [`Policy`]. Every operation runs
//! under one async mutex, so a selection, a policy change or an endpoint add
//! is observed by other callers either entirely or not at all.
//!
//! # Data Flow
//! ```text
//! select()        → lock → pick index by policy → counter += 1 → snapshot → unlock
//! set_policy()    → parse name → lock → swap policy → unlock
//! add_endpoint()  → validate id → lock → append (or no-op) → read pool size → unlock
//! get_stats()     → lock → snapshot → unlock
//! snapshot()      → lock → policy + snapshot → unlock
//! ```

pub mod endpoint;
pub mod policy;
pub mod pool;

pub use endpoint::EndpointId;
pub use policy::Policy;
pub use pool::{AddOutcome, RotationCursor, Selection, SelectorState, Stats};

use crate::error::SelectorError;
use tokio::sync::Mutex;

/// A policy switch: what was active before and what is active now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyChange {
    pub previous: Policy,
    pub current: Policy,
}

/// Result of an add: what happened and the pool size right after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointAdded {
    pub outcome: AddOutcome,
    pub pool_size: usize,
}

/// Thread-safe backend selector
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct Selector {
    state: Mutex<SelectorState>,
}

impl Selector {
    /// Create a selector over an initial endpoint list with all counters at zero
    pub fn new(endpoints: impl IntoIterator<Item = EndpointId>, policy: Policy) -> Self {
        Self::from_state(SelectorState::new(endpoints, policy))
    }

    /// Wrap an already-built state
    pub fn from_state(state: SelectorState) -> Self {
        tracing::info!(
            endpoint_count = state.len(),
            policy = %state.policy(),
            "Selector initialized"
        );

        Self {
            state: Mutex::new(state),
        }
    }

    /// Choose one endpoint under the active policy and record the selection
    ///
    /// # Errors
    ///
    /// Returns `SelectorError::EmptyPool` if the pool has no endpoints.
    pub async fn select(&self) -> Result<Selection, SelectorError> {
        let mut state = self.state.lock().await;
        let selection = state.select().inspect_err(|e| {
            tracing::warn!(error = %e, policy = %state.policy(), "Selection failed");
        })?;

        tracing::debug!(
            endpoint = %selection.endpoint,
            policy = %selection.policy,
            next_rotation = state.cursor().position(),
            "Selected endpoint"
        );

        Ok(selection)
    }

    /// Switch the active policy by wire name
    ///
    /// An unrecognised name leaves the active policy untouched.
    ///
    /// # Errors
    ///
    /// Returns `SelectorError::UnknownPolicy` if `name` is not one of
    /// `round_robin`, `random`, `least_connections`.
    pub async fn set_policy(&self, name: &str) -> Result<PolicyChange, SelectorError> {
        let policy = name.parse::<Policy>().inspect_err(|_| {
            tracing::warn!(requested = %name, "Rejected unknown selection policy");
        })?;

        let previous = self.state.lock().await.set_policy(policy);

        tracing::info!(
            previous = %previous,
            current = %policy,
            "Selection policy changed"
        );

        Ok(PolicyChange {
            previous,
            current: policy,
        })
    }

    /// Add an endpoint to the pool with a zero counter
    ///
    /// Adding an identifier that is already present succeeds without changing
    /// anything, including its counter.
    ///
    /// # Errors
    ///
    /// Returns `SelectorError::InvalidEndpoint` if `identifier` is empty or blank.
    pub async fn add_endpoint(&self, identifier: &str) -> Result<EndpointAdded, SelectorError> {
        let endpoint = EndpointId::parse(identifier)?;

        let mut state = self.state.lock().await;
        let outcome = state.add_endpoint(endpoint.clone());
        let pool_size = state.len();

        match outcome {
            AddOutcome::Added => tracing::info!(
                endpoint = %endpoint,
                pool_size,
                "Endpoint added to pool"
            ),
            AddOutcome::AlreadyPresent => tracing::debug!(
                endpoint = %endpoint,
                "Endpoint already in pool, ignoring add"
            ),
        }

        Ok(EndpointAdded { outcome, pool_size })
    }

    /// Snapshot of all selection counters
    pub async fn get_stats(&self) -> Stats {
        self.state.lock().await.stats()
    }

    /// Active policy and counters, read under one lock
    pub async fn snapshot(&self) -> (Policy, Stats) {
        let state = self.state.lock().await;
        (state.policy(), state.stats())
    }

    /// Active policy
    pub async fn policy(&self) -> Policy {
        self.state.lock().await.policy()
    }

    /// Pool members in insertion order
    pub async fn endpoints(&self) -> Vec<EndpointId> {
        self.state.lock().await.endpoints()
    }

    /// Number of endpoints in the pool
    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    /// Whether the pool is empty
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }
}
