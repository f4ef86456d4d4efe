//! Course Catalog shared types
//!
//! Request and response shapes exchanged between the backend and its
//! clients. Keeping them in one crate means the API surface has exactly
//! one definition per payload.

pub mod types;
