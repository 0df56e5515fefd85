//! Endpoint pool, selection counters and rotation cursor
//!
//! `SelectorState` is the unsynchronised core of the selector. It keeps the
//! pool and its counters in a single ordered vector, so pool membership and
//! counter membership can never diverge, and drives round-robin with an index
//! into that same vector.
//!
//! Concurrency is handled one level up by [`crate::selector::Selector`],
//! which owns a `SelectorState` behind a mutex.

use super::endpoint::EndpointId;
use super::policy::Policy;
use crate::error::SelectorError;
use rand::Rng;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// One pool member and its cumulative selection count
#[derive(Debug, Clone)]
struct PoolEntry {
    id: EndpointId,
    selections: u64,
}

/// Round-robin position over the ordered pool
///
/// Holds the index of the next endpoint to hand out. Appending to the pool
/// never moves it, so a new endpoint is picked up when the rotation reaches
/// the tail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationCursor {
    next: usize,
}

impl RotationCursor {
    /// Index of the endpoint the next round-robin selection will return
    pub fn position(&self) -> usize {
        self.next
    }

    /// Return the current position and move one step forward (wrapping at `len`)
    fn advance(&mut self, len: usize) -> usize {
        let current = self.next;
        self.next = (current + 1) % len;
        current
    }
}

/// Result of adding an endpoint to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Endpoint was appended with a zero counter
    Added,
    /// Endpoint was already a pool member; nothing changed
    AlreadyPresent,
}

/// Point-in-time snapshot of per-endpoint selection counters
///
/// Entries are kept in pool insertion order and serialise as a JSON object
/// with keys in that same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    counts: Vec<(EndpointId, u64)>,
}

impl Stats {
    /// Counter for an endpoint, or `None` if it is not a pool member
    pub fn get(&self, endpoint: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(id, _)| id.as_str() == endpoint)
            .map(|(_, count)| *count)
    }

    /// Iterate `(endpoint, count)` pairs in pool order
    pub fn iter(&self) -> impl Iterator<Item = (&EndpointId, u64)> {
        self.counts.iter().map(|(id, count)| (id, *count))
    }

    /// Number of endpoints in the snapshot
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (id, count) in &self.counts {
            map.serialize_entry(id.as_str(), count)?;
        }
        map.end()
    }
}

/// Outcome of a single selection
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Selection {
    /// Chosen endpoint
    pub endpoint: EndpointId,
    /// Policy that made the choice
    pub policy: Policy,
    /// Counters after this selection was recorded
    pub stats: Stats,
}

/// Endpoint pool, counters, rotation cursor and active policy
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    entries: Vec<PoolEntry>,
    positions: HashMap<EndpointId, usize>,
    cursor: RotationCursor,
    policy: Policy,
}

impl SelectorState {
    /// Build a state from an initial endpoint list
    ///
    /// Duplicate identifiers in the list are ignored after their first occurrence.
    pub fn new(endpoints: impl IntoIterator<Item = EndpointId>, policy: Policy) -> Self {
        let mut state = Self {
            policy,
            ..Self::default()
        };
        for endpoint in endpoints {
            state.add_endpoint(endpoint);
        }
        state
    }

    /// Active policy
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Replace the active policy, returning the previous one
    pub fn set_policy(&mut self, policy: Policy) -> Policy {
        std::mem::replace(&mut self.policy, policy)
    }

    /// Current rotation cursor
    pub fn cursor(&self) -> RotationCursor {
        self.cursor
    }

    /// Number of endpoints in the pool
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `endpoint` is a pool member
    pub fn contains(&self, endpoint: &EndpointId) -> bool {
        self.positions.contains_key(endpoint)
    }

    /// Selection counter for a pool member
    pub fn count(&self, endpoint: &EndpointId) -> Option<u64> {
        self.positions
            .get(endpoint)
            .map(|&index| self.entries[index].selections)
    }

    /// Pool members in insertion order
    pub fn endpoints(&self) -> Vec<EndpointId> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    /// Append an endpoint with a zero counter unless it is already present
    pub fn add_endpoint(&mut self, endpoint: EndpointId) -> AddOutcome {
        if self.positions.contains_key(&endpoint) {
            return AddOutcome::AlreadyPresent;
        }
        self.positions.insert(endpoint.clone(), self.entries.len());
        self.entries.push(PoolEntry {
            id: endpoint,
            selections: 0,
        });
        AddOutcome::Added
    }

    /// Snapshot of all counters in pool order
    pub fn stats(&self) -> Stats {
        Stats {
            counts: self
                .entries
                .iter()
                .map(|entry| (entry.id.clone(), entry.selections))
                .collect(),
        }
    }

    /// Select an endpoint with the thread-local RNG
    pub fn select(&mut self) -> Result<Selection, SelectorError> {
        self.select_with(&mut rand::rng())
    }

    /// Select an endpoint under the active policy and record the selection
    ///
    /// The RNG is only consulted by [`Policy::Random`].
    pub fn select_with<R: Rng>(&mut self, rng: &mut R) -> Result<Selection, SelectorError> {
        if self.entries.is_empty() {
            return Err(SelectorError::EmptyPool);
        }

        let index = match self.policy {
            Policy::RoundRobin => self.cursor.advance(self.entries.len()),
            Policy::Random => rng.random_range(0..self.entries.len()),
            Policy::LeastConnections => self.least_selected(),
        };

        let entry = &mut self.entries[index];
        entry.selections += 1;
        let endpoint = entry.id.clone();

        Ok(Selection {
            endpoint,
            policy: self.policy,
            stats: self.stats(),
        })
    }

    /// Index of the endpoint with the fewest selections
    ///
    /// `min_by_key` returns the first minimum, which is the earliest-inserted
    /// endpoint among those tied. Caller guarantees the pool is non-empty.
    fn least_selected(&self) -> usize {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| entry.selections)
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    #[cfg(test)]
    fn set_count(&mut self, endpoint: &str, count: u64) {
        let id = EndpointId::parse(endpoint).expect("test endpoint");
        if let Some(&index) = self.positions.get(&id) {
            self.entries[index].selections = count;
        }
    }
}
