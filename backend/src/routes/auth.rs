//! Authentication routes
//!
//! Thin request/response mapping over the auth service. Access tokens
//! travel exclusively in the `Authorization: Bearer` header.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use course_catalog_shared::types::{
    LoginRequest, MessageResponse, RegisterRequest, ResendVerificationRequest, SessionIssued,
    UserProfile,
};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::routes::device_from_headers;
use crate::state::AppState;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", get(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .route("/profile", get(get_profile))
        .route("/onboarding-complete", patch(complete_onboarding))
}

/// Register a new user account
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state
        .auth
        .register(&req.full_name, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Deserialize)]
struct VerifyEmailParams {
    token: String,
}

/// Verify an email address using the token sent by mail
///
/// GET /api/v1/auth/verify-email?token=...
async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailParams>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionIssued>> {
    let device = device_from_headers(&headers);
    let issued = state.auth.verify_email(&params.token, device).await?;
    Ok(Json(issued))
}

/// Re-send the verification link
///
/// POST /api/v1/auth/resend-verification
async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<ResendVerificationRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = state.auth.resend_verification(&req.email).await?;
    Ok(Json(response))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionIssued>> {
    let device = device_from_headers(&headers);
    let issued = state.auth.login(&req.email, &req.password, device).await?;
    Ok(Json(issued))
}

/// Log out the calling session only
///
/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    let response = state
        .auth
        .logout(&current.user, Some(current.session_id))
        .await?;
    Ok(Json(response))
}

/// Log out every session of the account
///
/// POST /api/v1/auth/logout-all
async fn logout_all(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    let response = state.auth.logout(&current.user, None).await?;
    Ok(Json(response))
}

/// Get the authenticated user's profile
///
/// GET /api/v1/auth/profile
async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.auth.get_profile(&current.user)))
}

/// Mark onboarding as completed
///
/// PATCH /api/v1/auth/onboarding-complete
async fn complete_onboarding(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    let response = state.auth.complete_onboarding(&current.user).await?;
    Ok(Json(response))
}
