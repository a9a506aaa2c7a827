//! Error types for the cache server
//!
//! Provides unified error handling using thiserror. Absence of a key is never
//! an error here; lookups report it as a negative result in the response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid request data (key/ttl/amount/batch out of range, bad JSON)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// INCREMENT applied to a value that is not a number
    #[error("Value at key '{0}' is not a number")]
    NonNumeric(String),

    /// Per-IP request quota exhausted
    #[error("Too many requests")]
    RateLimited,

    /// Unknown route
    #[error("Route not found")]
    RouteNotFound,

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::NonNumeric(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            CacheError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            CacheError::RouteNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            CacheError::Internal(detail) => {
                // The detail goes to the log; production clients get a
                // redacted message.
                error!("Internal server error: {}", detail);
                let msg = if crate::config::is_production() {
                    "Internal Server Error".to_string()
                } else {
                    detail.clone()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        if status.is_client_error() {
            warn!(%status, "{}", message);
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
