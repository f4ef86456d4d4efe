//! Common test utilities for integration tests
//!
//! Provides a test application wired over in-memory stores and a
//! recording mailer, so the full HTTP surface can be exercised without a
//! database or an SMTP relay.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use course_catalog_backend::config::AppConfig;
use course_catalog_backend::email::{EmailError, Mailer, VerificationEmail};
use course_catalog_backend::repositories::{
    InMemoryCourseStore, InMemoryDashboardStore, InMemoryUserStore,
};
use course_catalog_backend::routes;
use course_catalog_backend::state::AppState;
use course_catalog_shared::types::Course;

/// Mailer that records every message and can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<VerificationEmail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Extract the token embedded in the most recent verification link.
    pub fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let link = &sent.last().expect("no mail sent").verification_link;
        link.split("token=")
            .nth(1)
            .expect("link has no token")
            .to_string()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &VerificationEmail) -> Result<(), EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub users: Arc<InMemoryUserStore>,
    pub dashboards: Arc<InMemoryDashboardStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    /// Create a new test application over in-memory stores.
    pub fn new() -> Self {
        Self::with_config(test_config(), Vec::new())
    }

    /// Same, with courses pre-seeded into the catalog.
    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self::with_config(test_config(), courses)
    }

    /// Full control over configuration (e.g. pointing the OAuth endpoint
    /// URLs at a mock server).
    pub fn with_config(config: AppConfig, courses: Vec<Course>) -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let dashboards = Arc::new(InMemoryDashboardStore::new());
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState::with_stores(
            users.clone(),
            dashboards.clone(),
            Arc::new(InMemoryCourseStore::with_courses(courses)),
            mailer.clone(),
            config,
        )
        .expect("test state should construct");

        let app = routes::create_router(state);

        Self {
            app,
            users,
            dashboards,
            mailer,
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a GET request with a bearer token
    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with a bearer token and empty body
    pub async fn post_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a PATCH request with a bearer token and empty body
    pub async fn patch_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("PATCH")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        (status, body_str)
    }

    /// Register an account and return the response body.
    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> serde_json::Value {
        let body = serde_json::json!({
            "full_name": full_name,
            "email": email,
            "password": password
        });
        let (status, response) = self.post("/api/v1/auth/register", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {response}");
        serde_json::from_str(&response).unwrap()
    }

    /// Register and immediately verify; returns the verify response
    /// (session id + access token).
    pub async fn register_verified(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> serde_json::Value {
        self.register(full_name, email, password).await;
        let token = self.mailer.last_token();
        let (status, response) = self
            .get(&format!("/api/v1/auth/verify-email?token={token}"))
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {response}");
        serde_json::from_str(&response).unwrap()
    }

    /// Log in and return the issued session.
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let body = serde_json::json!({ "email": email, "password": password });
        let (status, response) = self.post("/api/v1/auth/login", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "login failed: {response}");
        serde_json::from_str(&response).unwrap()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret-key-for-testing-only-32chars".to_string();
    config
}
