//! Dashboard store
//!
//! One dashboard per user, created when the user's email is verified.
//! Insertion is idempotent per owner so a crash between the verified-flag
//! write and the dashboard write cannot lead to duplicates on retry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use course_catalog_shared::types::Dashboard;

use super::StoreError;

/// Persistence operations for dashboards.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Persist a dashboard. A dashboard already existing for the same
    /// owner makes this a no-op.
    async fn insert(&self, dashboard: &Dashboard) -> Result<(), StoreError>;

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Dashboard>, StoreError>;
}

/// Postgres-backed dashboard store
pub struct PgDashboardStore {
    pool: PgPool,
}

impl PgDashboardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DashboardRow {
    id: Uuid,
    owner: Uuid,
    created_at: DateTime<Utc>,
}

impl From<DashboardRow> for Dashboard {
    fn from(row: DashboardRow) -> Self {
        Dashboard {
            id: row.id,
            owner: row.owner,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl DashboardStore for PgDashboardStore {
    async fn insert(&self, dashboard: &Dashboard) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO dashboards (id, owner, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner) DO NOTHING
            "#,
        )
        .bind(dashboard.id)
        .bind(dashboard.owner)
        .bind(dashboard.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Dashboard>, StoreError> {
        let row = sqlx::query_as::<_, DashboardRow>(
            "SELECT id, owner, created_at FROM dashboards WHERE owner = $1",
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Dashboard::from))
    }
}
