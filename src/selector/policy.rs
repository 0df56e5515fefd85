//! Selection policies

use crate::error::SelectorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Active selection algorithm
///
/// Wire names are snake_case (`round_robin`, `random`, `least_connections`),
/// both for serde (config file, JSON responses) and for `FromStr` (the
/// `/api/set_algorithm/{algorithm}` path segment).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Rotate through the pool in insertion order
    #[default]
    RoundRobin,
    /// Uniform random draw with replacement
    Random,
    /// Fewest selections so far, earliest-inserted on ties
    LeastConnections,
}

impl Policy {
    /// All policies, in declaration order
    pub const ALL: [Policy; 3] = [Policy::RoundRobin, Policy::Random, Policy::LeastConnections];

    /// Wire name of this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::Random => "random",
            Self::LeastConnections => "least_connections",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| SelectorError::UnknownPolicy {
                name: s.to_string(),
            })
    }
}
