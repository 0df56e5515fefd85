//! Error types for Circulate
//!
//! `SelectorError` covers failures of the selection engine itself. `AppError`
//! wraps it together with startup/configuration failures and implements
//! `IntoResponse` for Axum handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors returned by the selection engine
///
/// None of these are fatal to the process: each one fails the single
/// operation that produced it and leaves the selector state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Endpoint identifier was empty, blank or missing from the request
    #[error("Invalid endpoint identifier: must be a non-empty string")]
    InvalidEndpoint,

    /// Policy name did not match any known selection policy
    #[error(
        "Unknown selection policy '{name}' (expected one of: round_robin, random, least_connections)"
    )]
    UnknownPolicy { name: String },

    /// Selection was attempted with no endpoints in the pool
    #[error("No endpoints available for selection")]
    EmptyPool,
}

impl SelectorError {
    /// Short label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint => "invalid_endpoint",
            Self::UnknownPolicy { .. } => "unknown_policy",
            Self::EmptyPool => "empty_pool",
        }
    }

    /// HTTP status the error maps to at the API boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEndpoint | Self::UnknownPolicy { .. } => StatusCode::BAD_REQUEST,
            Self::EmptyPool => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Selector(err) => (err.status_code(), err.to_string()),
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
