//! API Integration Tests
//!
//! Exercises the full router (spec §6 HTTP surface) end to end where no
//! database is needed, and against a real Postgres+Redis pair — gated
//! behind `TEST_DATABASE_URL`/`TEST_REDIS_URL` — for the flows that need
//! persisted state (spec §8 scenarios S1-S6).

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use firmante_api::notify::{Notifier, ProcessWideCredentials};
use firmante_api::pdf::PassthroughStamper;
use firmante_api::{create_router, AppState};
use firmante_auth::{config::AuthConfig, JwtService};
use firmante_db::{Database, DatabaseConfig};

/// Builds a real `AppState` + router against `TEST_DATABASE_URL`/`TEST_REDIS_URL`.
///
/// Every test that depends on this is `#[ignore]`d by default and meant
/// to be run explicitly in a CI job with those env vars set.
async fn create_test_app() -> axum::Router {
    let db_config = DatabaseConfig {
        postgres_url: std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL"),
        redis_url: std::env::var("TEST_REDIS_URL").expect("TEST_REDIS_URL"),
        pg_max_connections: 5,
        pg_min_connections: 1,
        pg_acquire_timeout_secs: 5,
    };
    let db = Database::connect(&db_config).await.expect("connect test database");
    db.migrate().await.expect("run migrations");

    let auth_config = AuthConfig {
        jwt: firmante_auth::config::JwtConfig {
            access_secret: "test-access-secret-at-least-32-bytes-long".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-bytes!!".to_string(),
            access_token_lifetime: std::time::Duration::from_secs(15 * 60),
            refresh_token_lifetime: std::time::Duration::from_secs(7 * 24 * 60 * 60),
            issuer: "firmante-test".to_string(),
        },
    };

    let state = AppState {
        db: Arc::new(db),
        jwt: Arc::new(JwtService::new(auth_config.jwt)),
        storage_root: Arc::new(PathBuf::from(std::env::temp_dir().join("firmante-test-uploads"))),
        front_url: Arc::new("https://app.firmante.test".to_string()),
        notifier: Arc::new(Notifier::new(ProcessWideCredentials {
            resend_api_key: None,
            zapi_instance_id: None,
            zapi_token: None,
            zapi_client_token: None,
        })),
        pdf_stamper: Arc::new(PassthroughStamper),
    };

    create_router(state)
}

async fn json_request(router: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };
    let request = Request::builder().method(method).uri(uri).header("Content-Type", "application/json").body(body).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// =============================================================================
// Health — no database connection is required to exercise these routes'
// shape, but `create_test_app` still needs one to build `AppState`; the
// liveness route itself (`handlers::health::health_check`) never touches it.
// =============================================================================

#[tokio::test]
#[ignore = "requires test database setup"]
async fn test_liveness() {
    let router = create_test_app().await;
    let (status, json) = json_request(&router, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
#[ignore = "requires test database setup"]
async fn test_readiness_reports_both_components() {
    let router = create_test_app().await;
    let (status, json) = json_request(&router, "GET", "/api/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["database"]["status"], "healthy");
    assert_eq!(json["redis"]["status"], "healthy");
}

// =============================================================================
// Identity & Session (C3) — spec §4.3, scenario S1's opening steps.
// =============================================================================

#[cfg(test)]
mod auth_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_register_then_login() {
        let router = create_test_app().await;

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/auth/register",
            Some(json!({
                "name": "Owner One",
                "email": format!("owner-{}@example.com", uuid::Uuid::new_v4()),
                "password": "StrongPw1"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.get("accessToken").is_some());
        assert!(json.get("refreshToken").is_some());
        assert!(json.get("tenantId").is_some());
    }

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_register_duplicate_email_conflicts() {
        let router = create_test_app().await;
        let email = format!("dup-{}@example.com", uuid::Uuid::new_v4());
        let body = json!({ "name": "First", "email": email, "password": "StrongPw1" });

        let (first_status, _) = json_request(&router, "POST", "/api/auth/register", Some(body.clone())).await;
        assert_eq!(first_status, StatusCode::OK);

        let (second_status, _) = json_request(&router, "POST", "/api/auth/register", Some(body)).await;
        assert_eq!(second_status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_login_invalid_credentials_is_unauthorized() {
        let router = create_test_app().await;
        let (status, _) = json_request(
            &router,
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": "whatever" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    /// Scenario S6 — refresh rotation: the same raw refresh token can only
    /// be redeemed once.
    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_refresh_token_rotation_rejects_reuse() {
        let router = create_test_app().await;
        let email = format!("rotate-{}@example.com", uuid::Uuid::new_v4());
        let (_, register) = json_request(
            &router,
            "POST",
            "/api/auth/register",
            Some(json!({ "name": "Rotator", "email": email, "password": "StrongPw1" })),
        )
        .await;
        let refresh_token = register["refreshToken"].as_str().unwrap().to_string();

        let (first_status, first_body) =
            json_request(&router, "POST", "/api/auth/refresh", Some(json!({ "refreshToken": refresh_token }))).await;
        assert_eq!(first_status, StatusCode::OK);
        assert_ne!(first_body["refreshToken"].as_str().unwrap(), refresh_token);

        let (second_status, _) =
            json_request(&router, "POST", "/api/auth/refresh", Some(json!({ "refreshToken": refresh_token }))).await;
        assert_eq!(second_status, StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Document Store (C7) — auth gating and boundary behavior (spec §8).
// =============================================================================

#[cfg(test)]
mod document_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_list_documents_requires_auth() {
        let router = create_test_app().await;
        let (status, _) = json_request(&router, "GET", "/api/documents", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_validate_unknown_buffer_reports_not_found() {
        let router = create_test_app().await;

        let body = Body::from(b"not actually a pdf".to_vec());
        let request = Request::builder()
            .method("POST")
            .uri("/api/documents/validate-file")
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "NOT_FOUND");
    }
}

// =============================================================================
// Signer Session (C8) — unauthenticated share-token surface, spec §4.8.
// =============================================================================

#[cfg(test)]
mod sign_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_unknown_share_token_is_not_found() {
        let router = create_test_app().await;
        let (status, _) = json_request(&router, "GET", "/api/sign/not-a-real-token", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Error handling — these don't require a live database connection beyond
// what `create_test_app` needs to assemble `AppState`; kept `#[ignore]` for
// the same reason as every other test in this file.
// =============================================================================

#[cfg(test)]
mod error_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_unknown_route_is_not_found() {
        let router = create_test_app().await;
        let (status, _) = json_request(&router, "GET", "/api/this-route-does-not-exist", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "requires test database setup"]
    async fn test_malformed_json_body_is_bad_request() {
        let router = create_test_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
