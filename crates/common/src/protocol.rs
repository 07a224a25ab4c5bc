//! Response types for the burnbox HTTP API.
//!
//! Request bodies are deliberately not typed here. The HTTP layer parses
//! them leniently from raw JSON so that every malformed input (wrong type,
//! junk TTL, missing field) can answer a uniform `400` instead of a
//! framework rejection. Responses are fixed shapes and live here so tests
//! and future clients share one definition.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Store endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `POST /`.
///
/// `key` is the one-time token: `<storage_key>~<decryption_key>`. It is the
/// only copy of the decryption key in existence; the service does not retain
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSecretResponse {
    /// Token that redeems the stored secret exactly once.
    pub key: String,
}

// ---------------------------------------------------------------------------
// Reveal endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `POST /get-secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealSecretResponse {
    /// The recovered plaintext. The record backing it is already destroyed.
    pub password: String,
}

// ---------------------------------------------------------------------------
// Preview endpoint
// ---------------------------------------------------------------------------

/// Response body for `POST /preview-secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSecretResponse {
    /// Whether a live secret still exists for the token. Checking does not
    /// consume the secret.
    pub exists: bool,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Name of the active store backend: `"memory"` or `"sqlite"`.
    pub backend: String,
    /// Whether the store answered the liveness probe.
    pub store_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_secret_response_serialises_key_field() {
        let r = StoreSecretResponse {
            key: "0f9a5631e3ee4acfa0e87b25b29547bd~abc".into(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"key\""));
        let decoded: StoreSecretResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.key, r.key);
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "password is required");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("password is required"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            backend: "memory".into(),
            store_ok: true,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.backend, "memory");
        assert!(decoded.store_ok);
    }
}
