//! Signed-token issuance and verification
//!
//! One codec signs both token kinds: verification tokens carry only the
//! subject, access tokens additionally carry the session id they are
//! bound to. Keys are pre-computed once at startup and shared.
//!
//! Verification collapses every decode failure (bad signature, malformed
//! payload, elapsed expiry) into [`ApiError::InvalidToken`]; callers
//! cannot distinguish a tampered token from an expired one.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Session id, present only on access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<Uuid>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token codec with pre-computed keys
///
/// Keys are expensive to derive, so this is built once at application
/// startup and cloned cheaply (the keys are wrapped in `Arc`).
#[derive(Clone)]
pub struct TokenCodec {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec from the configured secret and algorithm name.
    ///
    /// An unrecognized algorithm name is a startup failure; there is no
    /// fallback.
    pub fn new(secret: &str, algorithm: &str) -> anyhow::Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| anyhow::anyhow!("Unsupported signing algorithm: {}", algorithm))?;
        Ok(Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            algorithm,
        })
    }

    /// Sign a verification token: subject only, no session binding.
    pub fn issue_verification(&self, user_id: Uuid, ttl: Duration) -> Result<String, ApiError> {
        self.issue(user_id, None, ttl)
    }

    /// Sign an access token bound to a session entry.
    pub fn issue_access(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        self.issue(user_id, Some(session_id), ttl)
    }

    fn issue(&self, sub: Uuid, sid: Option<Uuid>, ttl: Duration) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            sid,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(self.algorithm);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                debug!(error = %e, "token rejected");
                Err(ApiError::InvalidToken)
            }
        }
    }
}
