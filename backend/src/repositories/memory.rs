//! In-memory store implementations
//!
//! Back the test suite and allow running the service without a database.
//! Each store serializes access through a mutex, which also gives the
//! session mutations the same no-lost-update behavior as the
//! single-statement Postgres operations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use course_catalog_shared::types::{Course, Dashboard};

use super::{CourseStore, DashboardStore, SessionEntry, StoreError, UserRecord, UserStore};

/// In-memory user store
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current session list, for assertions in tests.
    pub fn sessions_of(&self, user_id: Uuid) -> Vec<SessionEntry> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|u| u.sessions.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }

    async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.get_mut(&user.id) {
            // The session list is owned by the session operations below.
            existing.full_name = user.full_name.clone();
            existing.email = user.email.clone();
            existing.password_hash = user.password_hash.clone();
            existing.is_verified = user.is_verified;
            existing.has_completed_onboarding = user.has_completed_onboarding;
        }
        Ok(())
    }

    async fn append_session(&self, user_id: Uuid, entry: &SessionEntry) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            let now = Utc::now();
            user.sessions.retain(|s| s.is_live(now));
            user.sessions.push(entry.clone());
        }
        Ok(())
    }

    async fn remove_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            user.sessions.retain(|s| s.session_id != session_id);
        }
        Ok(())
    }

    async fn clear_sessions(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            user.sessions.clear();
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory dashboard store
#[derive(Default)]
pub struct InMemoryDashboardStore {
    dashboards: Mutex<Vec<Dashboard>>,
}

impl InMemoryDashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of dashboards, for assertions in tests.
    pub fn len(&self) -> usize {
        self.dashboards.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DashboardStore for InMemoryDashboardStore {
    async fn insert(&self, dashboard: &Dashboard) -> Result<(), StoreError> {
        let mut dashboards = self.dashboards.lock().unwrap();
        if dashboards.iter().any(|d| d.owner == dashboard.owner) {
            return Ok(());
        }
        dashboards.push(dashboard.clone());
        Ok(())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Dashboard>, StoreError> {
        let dashboards = self.dashboards.lock().unwrap();
        Ok(dashboards.iter().find(|d| d.owner == owner).cloned())
    }
}

/// In-memory course store
#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: Mutex<Vec<Course>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses: Mutex::new(courses),
        }
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn insert(&self, course: &Course) -> Result<(), StoreError> {
        self.courses.lock().unwrap().push(course.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.courses.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let courses = self.courses.lock().unwrap();
        Ok(courses.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Course>, StoreError> {
        let courses = self.courses.lock().unwrap();
        Ok(courses
            .iter()
            .filter(|c| c.category.as_deref() == Some(category))
            .cloned()
            .collect())
    }
}
