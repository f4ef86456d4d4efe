//! User store: identity records and their session registry
//!
//! Sessions live inside the user record (a JSONB column in Postgres).
//! Flag changes go through `update`, which deliberately does not write
//! the session list; session mutations have their own single-statement
//! operations so two concurrent logins cannot overwrite each other's
//! entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use course_catalog_shared::types::DeviceClass;

use super::StoreError;

/// One logged-in device/client instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub device: DeviceClass,
}

impl SessionEntry {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// User identity record.
///
/// `password_hash` holds an argon2 hash for password accounts, or the
/// OAuth sentinel marker for accounts created through a provider.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub has_completed_onboarding: bool,
    pub sessions: Vec<SessionEntry>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Find a session entry that matches `session_id` and has not expired.
    pub fn live_session(&self, session_id: Uuid) -> Option<&SessionEntry> {
        let now = Utc::now();
        self.sessions
            .iter()
            .find(|s| s.session_id == session_id && s.is_live(now))
    }
}

/// Persistence operations for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with `Conflict` when the email is taken.
    async fn insert(&self, user: &UserRecord) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Save flag and profile fields. The session list is not written;
    /// use the session operations below for that.
    async fn update(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Append a session entry, dropping entries already past expiry.
    async fn append_session(&self, user_id: Uuid, entry: &SessionEntry) -> Result<(), StoreError>;

    /// Remove a single session entry.
    async fn remove_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), StoreError>;

    /// Remove every session entry (whole-account logout).
    async fn clear_sessions(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Postgres-backed user store
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    full_name: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    has_completed_onboarding: bool,
    sessions: Json<Vec<SessionEntry>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            has_completed_onboarding: row.has_completed_onboarding,
            sessions: row.sessions.0,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, full_name, email, password_hash, is_verified, \
                            has_completed_onboarding, sessions, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &UserRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (id, full_name, email, password_hash, is_verified,
                 has_completed_onboarding, sessions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(user.has_completed_onboarding)
        .bind(Json(&user.sessions))
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                Err(StoreError::Conflict(format!(
                    "email already registered: {}",
                    user.email
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users SET
                full_name = $2,
                email = $3,
                password_hash = $4,
                is_verified = $5,
                has_completed_onboarding = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(user.has_completed_onboarding)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_session(&self, user_id: Uuid, entry: &SessionEntry) -> Result<(), StoreError> {
        // One statement: filter out expired entries and push the new one.
        sqlx::query(
            r#"
            UPDATE users
            SET sessions = COALESCE(
                    (SELECT jsonb_agg(s)
                     FROM jsonb_array_elements(sessions) AS s
                     WHERE (s->>'expires_at')::timestamptz > now()),
                    '[]'::jsonb
                ) || $2::jsonb
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(Json(entry))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET sessions = COALESCE(
                    (SELECT jsonb_agg(s)
                     FROM jsonb_array_elements(sessions) AS s
                     WHERE s->>'session_id' <> $2::text),
                    '[]'::jsonb
                )
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_sessions(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET sessions = '[]'::jsonb WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_session_lookup() {
        let session_id = Uuid::new_v4();
        let user = UserRecord {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_verified: true,
            has_completed_onboarding: false,
            sessions: vec![
                SessionEntry {
                    session_id,
                    expires_at: Utc::now() + chrono::Duration::minutes(30),
                    device: DeviceClass::Desktop,
                },
                SessionEntry {
                    session_id: Uuid::new_v4(),
                    expires_at: Utc::now() - chrono::Duration::minutes(1),
                    device: DeviceClass::Mobile,
                },
            ],
            created_at: Utc::now(),
        };

        assert!(user.live_session(session_id).is_some());
        // Expired entries are not live even though they are still listed.
        let expired_id = user.sessions[1].session_id;
        assert!(user.live_session(expired_id).is_none());
        assert!(user.live_session(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_session_entry_json_shape() {
        let entry = SessionEntry {
            session_id: Uuid::new_v4(),
            expires_at: Utc::now(),
            device: DeviceClass::Mobile,
        };
        let json = serde_json::to_value(&entry).unwrap();
        // Field names are relied on by the JSONB queries above.
        assert!(json.get("session_id").is_some());
        assert!(json.get("expires_at").is_some());
        assert_eq!(json.get("device").unwrap(), "mobile");
    }
}
