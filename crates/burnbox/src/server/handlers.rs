//! Axum request handlers for all service endpoints.
//!
//! Request bodies are parsed from raw JSON values rather than typed structs:
//! the status contract promises `400` for every malformed input, and typed
//! extraction would surface framework rejections (`422`) for some of them.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::warn;

use common::protocol::{
    ErrorResponse, HealthResponse, PreviewSecretResponse, RevealSecretResponse,
    StoreSecretResponse,
};
use common::ServiceError;

use super::state::AppState;
use crate::service::{DEFAULT_TTL_SECONDS, MAX_TTL_SECONDS};

/// `POST /` — encrypt and store a secret, answering with its one-time token.
///
/// Body fields: `password` (required, non-empty string) and `ttl` (optional
/// lifetime in seconds, default one week). An absent, `null`, or
/// empty-string `ttl` selects the default; anything else must be an integer
/// in `[1, 2419200]`.
pub async fn store_secret(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let password = match clean_password(&body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let ttl = match clean_ttl(&body) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match state.service.store(password, ttl).await {
        Ok(token) => (StatusCode::OK, Json(StoreSecretResponse { key: token })).into_response(),
        Err(e) => service_error_response(&e),
    }
}

/// `POST /get-secret` — redeem a token for its plaintext, burning the record.
///
/// Unknown, already-consumed, and expired tokens all answer the same `404`.
pub async fn reveal_secret(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let token = match clean_key(&body) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match state.service.reveal(token).await {
        Ok(Some(password)) => {
            (StatusCode::OK, Json(RevealSecretResponse { password })).into_response()
        }
        Ok(None) => not_found_response(),
        Err(e) => service_error_response(&e),
    }
}

/// `POST /preview-secret` — report whether a token is still redeemable,
/// without consuming it.
pub async fn preview_secret(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let token = match clean_key(&body) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match state.service.preview(token).await {
        Ok(exists) => (StatusCode::OK, Json(PreviewSecretResponse { exists })).into_response(),
        Err(e) => service_error_response(&e),
    }
}

/// `GET /health` — liveness of the service and its store.
///
/// Returns `200 OK` when the store answers the probe, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let store_ok = state.service.ping().await.is_ok();

    let (status_code, status_str) = if store_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        backend: state.backend.as_str().into(),
        store_ok,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Input cleaning
// ---------------------------------------------------------------------------

/// Extract the required non-empty `password` field, or the `400` rejecting it.
fn clean_password(body: &Value) -> Result<&str, Response> {
    match body.get("password").and_then(Value::as_str) {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(bad_request("password is required and must not be empty")),
    }
}

/// Extract the `ttl` field, applying the default where the caller left it out.
///
/// Accepts a JSON integer or an integer-valued string (form-style clients
/// send the latter). Absent, `null`, and `""` select the default lifetime.
fn clean_ttl(body: &Value) -> Result<u64, Response> {
    let ttl = match body.get("ttl") {
        None | Some(Value::Null) => DEFAULT_TTL_SECONDS,
        Some(Value::String(s)) if s.is_empty() => DEFAULT_TTL_SECONDS,
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| bad_request("ttl must be a positive integer number of seconds"))?,
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| bad_request("ttl must be a positive integer number of seconds"))?,
        Some(_) => return Err(bad_request("ttl must be a positive integer number of seconds")),
    };

    if ttl == 0 || ttl > MAX_TTL_SECONDS {
        return Err(bad_request(&format!(
            "ttl must be between 1 and {MAX_TTL_SECONDS} seconds"
        )));
    }
    Ok(ttl)
}

/// Extract the required non-empty `key` (token) field.
fn clean_key(body: &Value) -> Result<&str, Response> {
    match body.get("key").and_then(Value::as_str) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(bad_request("key is required and must not be empty")),
    }
}

fn bad_request(message: &str) -> Response {
    let err = ErrorResponse::new("bad_request", message);
    (StatusCode::BAD_REQUEST, Json(err)).into_response()
}

/// The one fixed body for every unredeemable token, whatever the cause.
fn not_found_response() -> Response {
    let err = ErrorResponse::new("not_found", "secret not found");
    (StatusCode::NOT_FOUND, Json(err)).into_response()
}

/// Map service-layer errors onto HTTP responses.
///
/// Backend failures are logged with detail but answered with a generic body;
/// the message must not leak store internals to callers.
fn service_error_response(e: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let err = match e {
        ServiceError::Validation(msg) => ErrorResponse::new("bad_request", msg.clone()),
        ServiceError::NotFound => ErrorResponse::new("not_found", "secret not found"),
        ServiceError::Unavailable(_) => {
            warn!(error = %e, "secret store unreachable");
            ErrorResponse::new("store_unavailable", "secret store unavailable")
        }
        ServiceError::Internal(_) => {
            warn!(error = %e, "internal failure");
            ErrorResponse::new("internal_error", "internal error")
        }
    };
    (status, Json(err)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::router;
    use super::*;
    use crate::config::StoreBackend;
    use crate::service::SecretService;
    use crate::store::{MockSecretStore, StoreError};

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn store_reveal_flow_over_http() {
        let app = router::build(AppState::default());

        let resp = app
            .clone()
            .oneshot(post_json("/", json!({"password": "hunter2", "ttl": 30})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let token = body_json(resp).await["key"].as_str().unwrap().to_owned();

        let resp = app
            .clone()
            .oneshot(post_json("/get-secret", json!({"key": token})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["password"], "hunter2");

        // The token is spent: the same request now finds nothing.
        let resp = app
            .clone()
            .oneshot(post_json("/get-secret", json!({"key": token})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["code"], "not_found");
    }

    #[tokio::test]
    async fn store_rejects_missing_password() {
        let app = router::build(AppState::default());
        let resp = app.oneshot(post_json("/", json!({}))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["code"], "bad_request");
    }

    #[tokio::test]
    async fn store_rejects_empty_password() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json("/", json!({"password": ""})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_rejects_junk_ttl() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json("/", json!({"password": "foo", "ttl": "bar"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_rejects_oversized_ttl() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json("/", json!({"password": "foo", "ttl": 99999999})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_accepts_string_ttl() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json("/", json!({"password": "foo", "ttl": "3600"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_defaults_empty_ttl() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json("/", json!({"password": "foo", "ttl": ""})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_rejects_non_json_body() {
        let app = router::build(AppState::default());
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from("password=foo"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reveal_rejects_missing_key() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json("/get-secret", json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reveal_unknown_token_is_404() {
        let app = router::build(AppState::default());
        let resp = app
            .oneshot(post_json(
                "/get-secret",
                json!({"key": "0f9a5631e3ee4acfa0e87b25b29547bd~bogus"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["code"], "not_found");
    }

    #[tokio::test]
    async fn preview_reports_liveness_over_http() {
        let app = router::build(AppState::default());

        let resp = app
            .clone()
            .oneshot(post_json("/", json!({"password": "peek", "ttl": 30})))
            .await
            .unwrap();
        let token = body_json(resp).await["key"].as_str().unwrap().to_owned();

        let resp = app
            .clone()
            .oneshot(post_json("/preview-secret", json!({"key": token})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["exists"], true);

        // Previewing did not burn it; revealing does.
        let resp = app
            .clone()
            .oneshot(post_json("/get-secret", json!({"key": token})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .clone()
            .oneshot(post_json("/preview-secret", json!({"key": token})))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["exists"], false);
    }

    #[tokio::test]
    async fn health_reports_ok_with_memory_store() {
        let app = router::build(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn store_answers_500_when_the_store_is_down() {
        let mut store = MockSecretStore::new();
        store
            .expect_put()
            .returning(|_, _, _| Err(StoreError::Unavailable("connection refused".into())));
        let state = AppState::new(SecretService::new(Arc::new(store)), StoreBackend::Memory);
        let app = router::build(state);

        let resp = app
            .oneshot(post_json("/", json!({"password": "hunter2", "ttl": 30})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["code"], "store_unavailable");
    }

    #[tokio::test]
    async fn reveal_answers_500_when_the_store_is_down() {
        let mut store = MockSecretStore::new();
        store
            .expect_get_and_consume()
            .returning(|_| Err(StoreError::Unavailable("connection refused".into())));
        let state = AppState::new(SecretService::new(Arc::new(store)), StoreBackend::Memory);
        let app = router::build(state);

        // A store outage is not "secret not found": the caller may retry.
        let resp = app
            .oneshot(post_json(
                "/get-secret",
                json!({"key": "0f9a5631e3ee4acfa0e87b25b29547bd~bogus"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["code"], "store_unavailable");
    }

    #[tokio::test]
    async fn health_reports_degraded_when_the_store_is_down() {
        let mut store = MockSecretStore::new();
        store
            .expect_ping()
            .returning(|| Err(StoreError::Unavailable("connection refused".into())));
        let state = AppState::new(SecretService::new(Arc::new(store)), StoreBackend::Memory);
        let app = router::build(state);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["store_ok"], false);
    }

    #[test]
    fn clean_ttl_defaults_when_absent_null_or_empty() {
        assert_eq!(clean_ttl(&json!({})).unwrap(), DEFAULT_TTL_SECONDS);
        assert_eq!(clean_ttl(&json!({"ttl": null})).unwrap(), DEFAULT_TTL_SECONDS);
        assert_eq!(clean_ttl(&json!({"ttl": ""})).unwrap(), DEFAULT_TTL_SECONDS);
    }

    #[test]
    fn clean_ttl_accepts_integers_and_integer_strings() {
        assert_eq!(clean_ttl(&json!({"ttl": 3600})).unwrap(), 3600);
        assert_eq!(clean_ttl(&json!({"ttl": "3600"})).unwrap(), 3600);
        assert_eq!(clean_ttl(&json!({"ttl": MAX_TTL_SECONDS})).unwrap(), MAX_TTL_SECONDS);
    }

    #[test]
    fn clean_ttl_rejects_junk() {
        assert!(clean_ttl(&json!({"ttl": "bar"})).is_err());
        assert!(clean_ttl(&json!({"ttl": 1.5})).is_err());
        assert!(clean_ttl(&json!({"ttl": -1})).is_err());
        assert!(clean_ttl(&json!({"ttl": []})).is_err());
        assert!(clean_ttl(&json!({"ttl": 0})).is_err());
        assert!(clean_ttl(&json!({"ttl": MAX_TTL_SECONDS + 1})).is_err());
    }

    #[test]
    fn clean_password_requires_non_empty_string() {
        assert_eq!(clean_password(&json!({"password": "pw"})).unwrap(), "pw");
        assert!(clean_password(&json!({})).is_err());
        assert!(clean_password(&json!({"password": ""})).is_err());
        assert!(clean_password(&json!({"password": 42})).is_err());
    }
}
