//! Authentication state machine
//!
//! Orchestrates register → verify → login → logout over the user store,
//! credential hasher, token codec, and mail capability. Every protected
//! endpoint goes through [`AuthService::authenticate`], which requires
//! both a valid signature and a live entry in the session registry.

use std::sync::Arc;

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use course_catalog_shared::types::{
    Dashboard, DeviceClass, MessageResponse, SessionIssued, UserProfile,
};

use crate::auth::{PasswordService, TokenCodec};
use crate::config::AuthConfig;
use crate::email::{DeliveryPolicy, Mailer, VerificationEmail};
use crate::error::{ApiError, ApiResult};
use crate::oauth::GoogleIdentity;
use crate::repositories::{DashboardStore, SessionEntry, StoreError, UserRecord, UserStore};

/// Password column marker for accounts created through OAuth. Never a
/// valid argon2 hash, so password verification always fails for them.
pub const OAUTH_PASSWORD_SENTINEL: &str = "oauth_google";

/// Authentication and session management service
pub struct AuthService {
    users: Arc<dyn UserStore>,
    dashboards: Arc<dyn DashboardStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenCodec,
    access_ttl: Duration,
    verification_ttl: Duration,
    frontend_url: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        dashboards: Arc<dyn DashboardStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenCodec,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            dashboards,
            mailer,
            tokens,
            access_ttl: Duration::minutes(config.access_token_ttl_minutes),
            verification_ttl: Duration::minutes(config.verification_ttl_minutes),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Register a new user account.
    ///
    /// The account starts unverified. A verification link is sent
    /// best-effort: delivery failure is logged and registration still
    /// succeeds.
    ///
    /// # Performance
    /// Password hashing is offloaded to the blocking thread pool via
    /// `spawn_blocking`.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<UserProfile> {
        let full_name = normalize_full_name(full_name);
        let email = normalize_email(email);

        if full_name.is_empty() {
            return Err(ApiError::Validation("Full name must not be empty".to_string()));
        }
        if !email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }
        if password.len() < 8 {
            return Err(ApiError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = PasswordService::hash_async(password.to_string()).await?;

        let user = UserRecord {
            id: Uuid::new_v4(),
            full_name,
            email,
            password_hash,
            is_verified: false,
            has_completed_onboarding: false,
            sessions: Vec::new(),
            created_at: Utc::now(),
        };
        // The unique index closes the window between the lookup above and
        // this insert.
        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(ApiError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, "user registered");
        self.send_verification(&user, "Verify your email", DeliveryPolicy::BestEffort)
            .await?;

        Ok(profile_of(&user))
    }

    /// Consume a verification token.
    ///
    /// The unverified → verified transition happens at most once: it
    /// flips the flag and creates the user's dashboard. A token replayed
    /// after that behaves as a plain login and just issues a fresh
    /// session, without re-sending mail or creating a second dashboard.
    pub async fn verify_email(&self, token: &str, device: DeviceClass) -> ApiResult<SessionIssued> {
        let claims = self.tokens.verify(token)?;
        let mut user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !user.is_verified {
            user.is_verified = true;
            self.users.update(&user).await?;
            self.dashboards
                .insert(&Dashboard {
                    id: Uuid::new_v4(),
                    owner: user.id,
                    created_at: Utc::now(),
                })
                .await?;
            info!(user_id = %user.id, "email verified");
        }

        self.issue_session(&user, device).await
    }

    /// Send a fresh verification link to an unverified account.
    ///
    /// Unlike registration, a delivery failure here is surfaced: the
    /// caller explicitly asked for this email and needs to know it did
    /// not go out.
    pub async fn resend_verification(&self, email: &str) -> ApiResult<MessageResponse> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if user.is_verified {
            return Ok(MessageResponse {
                message: "Email is already verified.".to_string(),
            });
        }

        self.send_verification(&user, "Resend email verification", DeliveryPolicy::Surface)
            .await?;

        Ok(MessageResponse {
            message: "Verification email resent successfully.".to_string(),
        })
    }

    /// Log in with email and password.
    ///
    /// Unknown email and wrong password produce the same error. An
    /// unverified account never gets a session; it gets a fresh
    /// verification link (best-effort) and `EmailNotVerified`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: DeviceClass,
    ) -> ApiResult<SessionIssued> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let valid =
            PasswordService::verify_async(password.to_string(), user.password_hash.clone()).await?;
        if !valid {
            warn!(user_id = %user.id, "login with invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        if !user.is_verified {
            self.send_verification(&user, "Verify your email", DeliveryPolicy::BestEffort)
                .await?;
            return Err(ApiError::EmailNotVerified);
        }

        info!(user_id = %user.id, "user logged in");
        self.issue_session(&user, device).await
    }

    /// Complete an OAuth login with identity claims from the provider.
    ///
    /// Find-or-create by normalized email. A provider-verified flag
    /// upgrades the local record one way; it never downgrades. Session
    /// issuance follows the same contract as password login.
    pub async fn login_with_provider(
        &self,
        identity: GoogleIdentity,
        device: DeviceClass,
    ) -> ApiResult<SessionIssued> {
        let email = normalize_email(&identity.email);

        let user = match self.users.find_by_email(&email).await? {
            Some(mut user) => {
                if !user.is_verified && identity.email_verified {
                    user.is_verified = true;
                    self.users.update(&user).await?;
                }
                user
            }
            None => {
                let user = UserRecord {
                    id: Uuid::new_v4(),
                    full_name: normalize_full_name(&identity.full_name),
                    email,
                    password_hash: OAUTH_PASSWORD_SENTINEL.to_string(),
                    is_verified: identity.email_verified,
                    has_completed_onboarding: false,
                    sessions: Vec::new(),
                    created_at: Utc::now(),
                };
                self.users.insert(&user).await?;
                info!(user_id = %user.id, "user created from oauth profile");
                user
            }
        };

        self.issue_session(&user, device).await
    }

    /// Remove one session, or every session when `session_id` is `None`.
    pub async fn logout(
        &self,
        user: &UserRecord,
        session_id: Option<Uuid>,
    ) -> ApiResult<MessageResponse> {
        match session_id {
            Some(sid) => self.users.remove_session(user.id, sid).await?,
            None => self.users.clear_sessions(user.id).await?,
        }
        info!(user_id = %user.id, all = session_id.is_none(), "logged out");
        Ok(MessageResponse {
            message: "Logout successful".to_string(),
        })
    }

    /// Public projection of the user record. No state change.
    pub fn get_profile(&self, user: &UserRecord) -> UserProfile {
        profile_of(user)
    }

    /// Mark onboarding as completed. Idempotent.
    pub async fn complete_onboarding(&self, user: &UserRecord) -> ApiResult<MessageResponse> {
        if user.has_completed_onboarding {
            return Ok(MessageResponse {
                message: "Onboarding already completed.".to_string(),
            });
        }

        let mut user = user.clone();
        user.has_completed_onboarding = true;
        self.users.update(&user).await?;

        Ok(MessageResponse {
            message: "User onboarding status updated successfully.".to_string(),
        })
    }

    /// Validate an access token end to end.
    ///
    /// Cryptographic validity alone is not enough: the token's session id
    /// must still be present and unexpired in the user's session
    /// registry. Revocation is modeled by deleting the session entry.
    pub async fn authenticate(&self, token: &str) -> ApiResult<(UserRecord, Uuid)> {
        let claims = self.tokens.verify(token)?;
        let session_id = claims
            .sid
            .ok_or_else(|| ApiError::Unauthenticated("Token carries no session".to_string()))?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if user.live_session(session_id).is_none() {
            warn!(user_id = %user.id, "token presented for a revoked session");
            return Err(ApiError::SessionRevoked);
        }

        Ok((user, session_id))
    }

    /// Append a new session entry and mint the access token bound to it.
    async fn issue_session(&self, user: &UserRecord, device: DeviceClass) -> ApiResult<SessionIssued> {
        let session_id = Uuid::new_v4();
        let expires_at = Utc::now() + self.access_ttl;
        let entry = SessionEntry {
            session_id,
            expires_at,
            device,
        };
        self.users.append_session(user.id, &entry).await?;

        let access_token = self.tokens.issue_access(user.id, session_id, self.access_ttl)?;

        Ok(SessionIssued {
            session_id,
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
            device,
        })
    }

    async fn send_verification(
        &self,
        user: &UserRecord,
        subject: &str,
        policy: DeliveryPolicy,
    ) -> ApiResult<()> {
        let token = self.tokens.issue_verification(user.id, self.verification_ttl)?;
        let email = VerificationEmail {
            subject: subject.to_string(),
            recipient: user.email.clone(),
            full_name: user.full_name.clone(),
            verification_link: format!("{}/verify-email?token={}", self.frontend_url, token),
        };

        match self.mailer.send(&email).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "failed to send verification email");
                match policy {
                    DeliveryPolicy::BestEffort => Ok(()),
                    DeliveryPolicy::Surface => Err(ApiError::EmailDeliveryFailed),
                }
            }
        }
    }
}

fn profile_of(user: &UserRecord) -> UserProfile {
    UserProfile {
        user_id: user.id,
        full_name: user.full_name.clone(),
        email: user.email.clone(),
        is_verified: user.is_verified,
        has_completed_onboarding: user.has_completed_onboarding,
        created_at: user.created_at,
    }
}

static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Strip markup, then trim surrounding whitespace.
fn sanitize(input: &str) -> String {
    MARKUP_RE.replace_all(input, "").trim().to_string()
}

fn normalize_email(email: &str) -> String {
    sanitize(email).to_lowercase()
}

fn normalize_full_name(name: &str) -> String {
    title_case(&sanitize(name))
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
