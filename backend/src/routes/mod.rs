//! Route definitions for the Course Catalog API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    http::{header, header::USER_AGENT, HeaderMap, Method},
    routing::get,
    Router,
};
use course_catalog_shared::types::DeviceClass;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod courses;
mod dashboard;
mod health;
mod oauth;


pub use auth::auth_routes;
pub use courses::course_routes;
pub use dashboard::dashboard_routes;
pub use oauth::oauth_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Course Catalog API v1" }))
        .nest("/auth", auth::auth_routes())
        .nest("/oauth", oauth::oauth_routes())
        .nest("/courses", courses::course_routes())
        .nest("/dashboard", dashboard::dashboard_routes())
}

/// Classify the calling device from the request headers.
pub(crate) fn device_from_headers(headers: &HeaderMap) -> DeviceClass {
    DeviceClass::from_user_agent(headers.get(USER_AGENT).and_then(|v| v.to_str().ok()))
}
