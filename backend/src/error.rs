//! Application error handling
//!
//! This module provides unified error handling for the API, converting
//! domain failures to appropriate HTTP responses. Authentication failures
//! have dedicated variants so the boundary mapping stays in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::repositories::StoreError;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("E-mail is already registered")]
    DuplicateEmail,

    /// Deliberately identical for unknown email and wrong password so the
    /// response does not leak which one failed.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email not verified. A new verification link has been sent")]
    EmailNotVerified,

    /// Covers tampered, malformed, and expired tokens alike.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Session has been revoked")]
    SessionRevoked,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Incomplete user info from provider")]
    IncompleteOAuthProfile,

    #[error("Failed to obtain access token from provider")]
    OAuthExchangeFailed,

    #[error("Failed to send verification email")]
    EmailDeliveryFailed,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Storage error")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::DuplicateEmail => (StatusCode::CONFLICT, "DUPLICATE_EMAIL", self.to_string()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", self.to_string())
            }
            ApiError::EmailNotVerified => {
                (StatusCode::FORBIDDEN, "EMAIL_NOT_VERIFIED", self.to_string())
            }
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", self.to_string()),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", self.to_string()),
            ApiError::SessionRevoked => {
                (StatusCode::UNAUTHORIZED, "SESSION_REVOKED", self.to_string())
            }
            ApiError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone())
            }
            ApiError::IncompleteOAuthProfile => {
                (StatusCode::BAD_REQUEST, "INCOMPLETE_OAUTH_PROFILE", self.to_string())
            }
            ApiError::OAuthExchangeFailed => {
                (StatusCode::UNAUTHORIZED, "OAUTH_EXCHANGE_FAILED", self.to_string())
            }
            ApiError::EmailDeliveryFailed => {
                (StatusCode::BAD_GATEWAY, "EMAIL_DELIVERY_FAILED", self.to_string())
            }
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Store(err) => {
                error!("Storage error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
