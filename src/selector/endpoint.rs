//! Type-safe endpoint identifier
//!
//! Endpoints are opaque strings (usually IP addresses). The only constraint
//! enforced is that an identifier is never empty or blank.

use crate::error::SelectorError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Validated endpoint identifier
///
/// # Construction
/// - `EndpointId::parse(s)`: validates, returns `SelectorError::InvalidEndpoint`
///   for empty or whitespace-only input. Use this for anything arriving over the wire.
/// - `TryFrom<&str>` / `TryFrom<String>`: same validation.
///
/// The identifier is stored exactly as given; no trimming or normalisation is
/// applied, so `"10.0.0.1"` and `" 10.0.0.1"` are distinct endpoints.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct EndpointId(String);

impl EndpointId {
    /// Validate and wrap an endpoint identifier
    pub fn parse(raw: impl Into<String>) -> Result<Self, SelectorError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SelectorError::InvalidEndpoint);
        }
        Ok(Self(raw))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EndpointId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EndpointId {
    type Error = SelectorError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl TryFrom<&str> for EndpointId {
    type Error = SelectorError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl Serialize for EndpointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
