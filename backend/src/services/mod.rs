//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! stores and external capabilities.

pub mod auth;
pub mod course;
pub mod dashboard;

pub use auth::AuthService;
pub use course::CourseService;
pub use dashboard::DashboardService;
