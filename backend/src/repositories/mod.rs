//! Data stores backing the authentication core and the catalog
//!
//! Each store is a capability trait with two implementations: a Postgres
//! one used in production and an in-memory one used by the test suite
//! (and for running the service without a database).

pub mod course;
pub mod dashboard;
pub mod memory;
pub mod user;

pub use course::{CourseStore, PgCourseStore};
pub use dashboard::{DashboardStore, PgDashboardStore};
pub use memory::{InMemoryCourseStore, InMemoryDashboardStore, InMemoryUserStore};
pub use user::{PgUserStore, SessionEntry, UserRecord, UserStore};

use thiserror::Error;

/// Failures surfaced by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}
