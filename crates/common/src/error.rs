//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::Validation`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Unavailable`] → 500
/// - [`ServiceError::Internal`] → 500
///
/// `NotFound` carries no detail on purpose: a token that was never issued,
/// one that was already consumed, and one whose secret expired all produce
/// the same error, so callers cannot probe which case they hit.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — missing or empty secret, or a TTL outside
    /// the accepted range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No live secret exists for the presented token.
    #[error("secret not found")]
    NotFound,

    /// The secret store could not be reached or failed mid-operation.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    ///
    /// Store unavailability is an internal fault from the caller's point of
    /// view and answers 500; 503 is reserved for the health endpoint.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound => 404,
            ServiceError::Unavailable(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }
}
