//! Request authentication
//!
//! Provides the extractor protected handlers use to resolve the caller.
//! A token must pass two checks: cryptographic validity and the presence
//! of a live entry in the user's session registry. Logging a session out
//! therefore revokes its token immediately, with no blocklist.

use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::repositories::UserRecord;
use crate::state::AppState;

/// Authenticated caller extracted from the bearer token
pub struct CurrentUser {
    pub user: UserRecord,
    pub session_id: Uuid,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("Missing authorization header".to_string()))?;

        // Check Bearer prefix
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthenticated("Invalid authorization format".to_string()))?;

        let (user, session_id) = app_state.auth.authenticate(token).await?;

        Ok(CurrentUser { user, session_id })
    }
}
