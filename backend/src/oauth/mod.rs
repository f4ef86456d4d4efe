//! Google OAuth bridge
//!
//! Exchanges a frontend authorization code for Google identity claims.
//! The claims feed the same login path as password authentication; this
//! module talks to the provider and nothing else.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::OAuthConfig;
use crate::error::ApiError;

/// Identity claims taken from the provider's user-info endpoint.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Provider-side stable subject id.
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub full_name: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct UserInfoResponse {
    sub: Option<String>,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

/// Client for the Google token and user-info endpoints.
pub struct GoogleOAuth {
    http: Client,
    config: OAuthConfig,
}

impl GoogleOAuth {
    /// Build the HTTP client once at startup, with an explicit timeout so
    /// a slow provider cannot hold requests open indefinitely.
    pub fn new(config: OAuthConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Exchange an authorization code and fetch the user's identity.
    pub async fn authenticate(&self, code: &str) -> Result<GoogleIdentity, ApiError> {
        let params = [
            ("code", code),
            ("client_id", self.config.google_client_id.as_str()),
            ("client_secret", self.config.google_client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "token exchange request failed");
                ApiError::OAuthExchangeFailed
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "token exchange rejected");
            return Err(ApiError::OAuthExchangeFailed);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|_| ApiError::OAuthExchangeFailed)?;
        let access_token = token.access_token.ok_or(ApiError::OAuthExchangeFailed)?;

        let info: UserInfoResponse = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "user-info request failed");
                ApiError::OAuthExchangeFailed
            })?
            .json()
            .await
            .map_err(|_| ApiError::OAuthExchangeFailed)?;

        let (Some(subject), Some(email)) = (info.sub, info.email) else {
            return Err(ApiError::IncompleteOAuthProfile);
        };

        Ok(GoogleIdentity {
            subject,
            email,
            email_verified: info.email_verified,
            full_name: info.name.unwrap_or_else(|| "Google User".to_string()),
        })
    }
}
