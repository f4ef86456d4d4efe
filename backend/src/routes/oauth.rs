//! OAuth routes

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};

use course_catalog_shared::types::{GoogleLoginRequest, SessionIssued};

use crate::error::ApiResult;
use crate::routes::device_from_headers;
use crate::state::AppState;

pub fn oauth_routes() -> Router<AppState> {
    Router::new().route("/google", post(google_login))
}

/// Authenticate via a Google OAuth authorization code
///
/// POST /api/v1/oauth/google
///
/// On success, logs in or creates the user account and returns a fresh
/// session, exactly like password login.
async fn google_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GoogleLoginRequest>,
) -> ApiResult<Json<SessionIssued>> {
    let device = device_from_headers(&headers);
    let identity = state.oauth.authenticate(&req.code).await?;
    let issued = state.auth.login_with_provider(identity, device).await?;
    Ok(Json(issued))
}
