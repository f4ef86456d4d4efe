//! Integration tests for the authentication endpoints
//!
//! Exercises the full HTTP surface over in-memory stores: registration
//! normalization, the exactly-once verification transition, session
//! bookkeeping, and token revocation.

mod common;

use axum::http::StatusCode;
use course_catalog_backend::repositories::UserStore;
use serde_json::json;

#[tokio::test]
async fn test_register_normalizes_email_and_name() {
    let app = common::TestApp::new();

    let profile = app
        .register("jane doe", " Jane@Example.com ", "secret123")
        .await;

    assert_eq!(profile["email"], "jane@example.com");
    assert_eq!(profile["full_name"], "Jane Doe");
    assert_eq!(profile["is_verified"], false);

    let stored = app
        .users
        .find_by_email("jane@example.com")
        .await
        .unwrap()
        .expect("user should be stored under the normalized email");
    assert!(!stored.is_verified);
    assert!(stored.sessions.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts_across_casing() {
    let app = common::TestApp::new();

    app.register("Jane Doe", " A@B.com ", "secret123").await;

    let body = json!({
        "full_name": "Other Jane",
        "email": "a@b.com",
        "password": "secret456"
    });
    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(response.contains("DUPLICATE_EMAIL"));
}

#[tokio::test]
async fn test_register_rejects_invalid_email_and_short_password() {
    let app = common::TestApp::new();

    let body = json!({
        "full_name": "Jane",
        "email": "not-an-email",
        "password": "secret123"
    });
    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({
        "full_name": "Jane",
        "email": "jane@example.com",
        "password": "short"
    });
    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verification_transition_is_exactly_once() {
    let app = common::TestApp::new();

    let profile = app.register("Jane Doe", "jane@example.com", "secret123").await;
    let user_id: uuid::Uuid = serde_json::from_value(profile["user_id"].clone()).unwrap();
    let token = app.mailer.last_token();

    // First use: flips the flag, creates exactly one dashboard, opens a
    // session.
    let (status, response) = app
        .get(&format!("/api/v1/auth/verify-email?token={token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let first: serde_json::Value = serde_json::from_str(&response).unwrap();

    let user = app.users.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.is_verified);
    assert_eq!(app.dashboards.len(), 1);
    assert_eq!(app.users.sessions_of(user_id).len(), 1);

    // Replay: behaves as a login. New session, no second dashboard, no
    // new mail.
    let mails_before = app.mailer.sent_count();
    let (status, response) = app
        .get(&format!("/api/v1/auth/verify-email?token={token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let replayed: serde_json::Value = serde_json::from_str(&response).unwrap();

    assert_ne!(replayed["session_id"], first["session_id"]);
    assert_eq!(app.dashboards.len(), 1);
    assert_eq!(app.users.sessions_of(user_id).len(), 2);
    assert_eq!(app.mailer.sent_count(), mails_before);
}

#[tokio::test]
async fn test_verify_email_with_garbage_token() {
    let app = common::TestApp::new();

    let (status, response) = app
        .get("/api/v1/auth/verify-email?token=not-a-real-token")
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(response.contains("INVALID_TOKEN"));
}

#[tokio::test]
async fn test_login_unverified_forbidden_and_no_session() {
    let app = common::TestApp::new();

    let profile = app.register("Jane Doe", "jane@example.com", "secret123").await;
    let user_id: uuid::Uuid = serde_json::from_value(profile["user_id"].clone()).unwrap();

    let body = json!({ "email": "jane@example.com", "password": "secret123" });
    let (status, response) = app.post("/api/v1/auth/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(response.contains("EMAIL_NOT_VERIFIED"));
    assert!(app.users.sessions_of(user_id).is_empty());
    // The failed login re-sent a verification link (register + this one).
    assert_eq!(app.mailer.sent_count(), 2);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_identical() {
    let app = common::TestApp::new();
    app.register_verified("Jane Doe", "jane@example.com", "secret123")
        .await;

    let wrong = json!({ "email": "jane@example.com", "password": "wrong-password" });
    let (status_wrong, body_wrong) = app.post("/api/v1/auth/login", &wrong.to_string()).await;

    let unknown = json!({ "email": "nobody@example.com", "password": "secret123" });
    let (status_unknown, body_unknown) = app.post("/api/v1/auth/login", &unknown.to_string()).await;

    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(body_wrong, body_unknown);
}

#[tokio::test]
async fn test_full_journey_register_verify_login() {
    let app = common::TestApp::new();

    // register("Jane Doe", " Jane@Example.com ", "secret123") succeeds and
    // stores the normalized email, unverified.
    let profile = app
        .register("Jane Doe", " Jane@Example.com ", "secret123")
        .await;
    let user_id: uuid::Uuid = serde_json::from_value(profile["user_id"].clone()).unwrap();
    assert_eq!(profile["email"], "jane@example.com");

    // verifyEmail flips the flag and opens the first session.
    let token = app.mailer.last_token();
    let (status, _) = app
        .get(&format!("/api/v1/auth/verify-email?token={token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let user = app.users.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.is_verified);
    assert_eq!(app.users.sessions_of(user_id).len(), 1);

    // Wrong password fails.
    let bad = json!({ "email": "jane@example.com", "password": "nope-nope" });
    let (status, response) = app.post("/api/v1/auth/login", &bad.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(response.contains("INVALID_CREDENTIALS"));

    // Correct password opens a second, concurrent session.
    app.login("jane@example.com", "secret123").await;
    assert_eq!(app.users.sessions_of(user_id).len(), 2);
}

#[tokio::test]
async fn test_logout_removes_only_named_session() {
    let app = common::TestApp::new();

    let first = app
        .register_verified("Jane Doe", "jane@example.com", "secret123")
        .await;
    let second = app.login("jane@example.com", "secret123").await;

    let first_token = first["access_token"].as_str().unwrap();
    let second_token = second["access_token"].as_str().unwrap();

    // Both sessions are valid before logout.
    let (status, _) = app.get_auth("/api/v1/auth/profile", first_token).await;
    assert_eq!(status, StatusCode::OK);

    // Log out the first session only.
    let (status, _) = app.post_auth("/api/v1/auth/logout", first_token).await;
    assert_eq!(status, StatusCode::OK);

    // Its token is now rejected even though the signature is still valid.
    let (status, response) = app.get_auth("/api/v1/auth/profile", first_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(response.contains("SESSION_REVOKED"));

    // The sibling session still passes the registry check.
    let (status, _) = app.get_auth("/api/v1/auth/profile", second_token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = common::TestApp::new();

    let first = app
        .register_verified("Jane Doe", "jane@example.com", "secret123")
        .await;
    let second = app.login("jane@example.com", "secret123").await;

    let (status, _) = app
        .post_auth("/api/v1/auth/logout-all", second["access_token"].as_str().unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);

    for token in [
        first["access_token"].as_str().unwrap(),
        second["access_token"].as_str().unwrap(),
    ] {
        let (status, _) = app.get_auth("/api/v1/auth/profile", token).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_profile_returns_canonical_projection() {
    let app = common::TestApp::new();

    let issued = app
        .register_verified("Jane Doe", "jane@example.com", "secret123")
        .await;
    let token = issued["access_token"].as_str().unwrap();

    let (status, response) = app.get_auth("/api/v1/auth/profile", token).await;
    assert_eq!(status, StatusCode::OK);

    let profile: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(profile["full_name"], "Jane Doe");
    assert_eq!(profile["email"], "jane@example.com");
    assert_eq!(profile["is_verified"], true);
    assert_eq!(profile["has_completed_onboarding"], false);
    // The projection never exposes credentials or sessions.
    assert!(profile.get("password_hash").is_none());
    assert!(profile.get("sessions").is_none());
}

#[tokio::test]
async fn test_onboarding_complete_is_idempotent() {
    let app = common::TestApp::new();

    let issued = app
        .register_verified("Jane Doe", "jane@example.com", "secret123")
        .await;
    let token = issued["access_token"].as_str().unwrap();

    let (status, response) = app
        .patch_auth("/api/v1/auth/onboarding-complete", token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("updated successfully"));

    let (status, response) = app
        .patch_auth("/api/v1/auth/onboarding-complete", token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("already completed"));
}

#[tokio::test]
async fn test_resend_verification_surfaces_delivery_failure() {
    let app = common::TestApp::new();

    app.register("Jane Doe", "jane@example.com", "secret123").await;

    // Unknown account.
    let body = json!({ "email": "nobody@example.com" });
    let (status, _) = app
        .post("/api/v1/auth/resend-verification", &body.to_string())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Happy path.
    let body = json!({ "email": " Jane@Example.com " });
    let (status, response) = app
        .post("/api/v1/auth/resend-verification", &body.to_string())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("resent successfully"));

    // Unlike registration, a delivery failure here is surfaced.
    app.mailer.set_failing(true);
    let (status, response) = app
        .post("/api/v1/auth/resend-verification", &body.to_string())
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(response.contains("EMAIL_DELIVERY_FAILED"));
}

#[tokio::test]
async fn test_dashboard_available_after_verification() {
    let app = common::TestApp::new();

    let issued = app
        .register_verified("Jane Doe", "jane@example.com", "secret123")
        .await;
    let token = issued["access_token"].as_str().unwrap();

    let (status, response) = app.get_auth("/api/v1/dashboard", token).await;
    assert_eq!(status, StatusCode::OK);

    let dashboard: serde_json::Value = serde_json::from_str(&response).unwrap();
    let profile = app.users.find_by_email("jane@example.com").await.unwrap().unwrap();
    assert_eq!(dashboard["owner"], serde_json::json!(profile.id));
}

#[tokio::test]
async fn test_session_records_device_class() {
    let app = common::TestApp::new();

    let profile = app.register("Jane Doe", "jane@example.com", "secret123").await;
    let user_id: uuid::Uuid = serde_json::from_value(profile["user_id"].clone()).unwrap();
    let token = app.mailer.last_token();

    // No User-Agent header on the test request, so the device class is
    // unknown.
    let (status, response) = app
        .get(&format!("/api/v1/auth/verify-email?token={token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let issued: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(issued["device"], "unknown");

    let sessions = app.users.sessions_of(user_id);
    assert_eq!(sessions.len(), 1);
}
