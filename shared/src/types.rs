//! API request and response types
//!
//! Response shapes are deliberately canonical: every endpoint that
//! returns user data returns [`UserProfile`], every endpoint that opens a
//! session returns [`SessionIssued`], and acknowledge-only endpoints
//! return [`MessageResponse`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Sessions and devices
// ============================================================================

/// Device class recorded on each session entry, derived from the
/// `User-Agent` header of the request that opened the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    #[default]
    Unknown,
}

impl DeviceClass {
    /// Classify a request by its `User-Agent` header, if present.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            None => DeviceClass::Unknown,
            Some(ua) if ua.contains("Mobile") => DeviceClass::Mobile,
            Some(ua) if ua.contains("Tablet") => DeviceClass::Tablet,
            Some(_) => DeviceClass::Desktop,
        }
    }
}

/// Result of opening a new session (login, email verification, or OAuth
/// login). The access token is bound to `session_id` and stops working
/// once that session is logged out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIssued {
    pub session_id: Uuid,
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub device: DeviceClass,
}

// ============================================================================
// Users
// ============================================================================

/// Public projection of a user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub is_verified: bool,
    pub has_completed_onboarding: bool,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgement body for endpoints that change state but have no
/// richer payload to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Requests
// ============================================================================

/// Request body for user registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Request body for password login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for re-sending the verification link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Request body for Google OAuth login. The code comes from the frontend
/// OAuth popup flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    pub code: String,
}

// ============================================================================
// Catalog and dashboard
// ============================================================================

/// A course offered in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tutor: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub available: bool,
    pub max_students: Option<i32>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user dashboard record, created when the user verifies their email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
}
