//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: token keys, the HTTP client,
//!    and store wiring are created once at startup
//! 2. **Cheap cloning**: everything is behind `Arc`
//! 3. **Immutable after creation**: state is read-only during request
//!    handling; all mutation goes through the stores

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::email::Mailer;
use crate::oauth::GoogleOAuth;
use crate::repositories::{
    CourseStore, DashboardStore, PgCourseStore, PgDashboardStore, PgUserStore, UserStore,
};
use crate::services::{AuthService, CourseService, DashboardService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// User store, exposed for the readiness probe
    pub users: Arc<dyn UserStore>,
    /// Authentication state machine
    pub auth: Arc<AuthService>,
    /// Google OAuth bridge
    pub oauth: Arc<GoogleOAuth>,
    /// Course catalog reads
    pub courses: Arc<CourseService>,
    /// Dashboard reads
    pub dashboards: Arc<DashboardService>,
}

impl AppState {
    /// Wire the production stores over a Postgres pool.
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, config: AppConfig) -> anyhow::Result<Self> {
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let dashboards: Arc<dyn DashboardStore> = Arc::new(PgDashboardStore::new(pool.clone()));
        let courses: Arc<dyn CourseStore> = Arc::new(PgCourseStore::new(pool));
        Self::with_stores(users, dashboards, courses, mailer, config)
    }

    /// Wire explicit store implementations. The test suite passes
    /// in-memory stores here.
    pub fn with_stores(
        users: Arc<dyn UserStore>,
        dashboards: Arc<dyn DashboardStore>,
        courses: Arc<dyn CourseStore>,
        mailer: Arc<dyn Mailer>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let tokens = TokenCodec::new(&config.auth.jwt_secret, &config.auth.jwt_algorithm)?;
        let auth = Arc::new(AuthService::new(
            users.clone(),
            dashboards.clone(),
            mailer,
            tokens,
            &config.auth,
        ));
        let oauth = Arc::new(GoogleOAuth::new(config.oauth.clone())?);
        let course_service = Arc::new(CourseService::new(courses));
        let dashboard_service = Arc::new(DashboardService::new(dashboards));

        Ok(Self {
            config: Arc::new(config),
            users,
            auth,
            oauth,
            courses: course_service,
            dashboards: dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{EmailError, VerificationEmail};
    use crate::repositories::{InMemoryCourseStore, InMemoryDashboardStore, InMemoryUserStore};

    struct NullMailer;

    #[async_trait::async_trait]
    impl Mailer for NullMailer {
        async fn send(&self, _email: &VerificationEmail) -> Result<(), EmailError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_state_clone_is_cheap() {
        let state = AppState::with_stores(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryDashboardStore::new()),
            Arc::new(InMemoryCourseStore::new()),
            Arc::new(NullMailer),
            AppConfig::default(),
        )
        .unwrap();

        // Clone should be O(1) - just Arc increments
        let _cloned = state.clone();
    }

    #[test]
    fn test_bad_algorithm_fails_wiring() {
        let mut config = AppConfig::default();
        config.auth.jwt_algorithm = "NOT-AN-ALG".to_string();
        let result = AppState::with_stores(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryDashboardStore::new()),
            Arc::new(InMemoryCourseStore::new()),
            Arc::new(NullMailer),
            config,
        );
        assert!(result.is_err());
    }
}
