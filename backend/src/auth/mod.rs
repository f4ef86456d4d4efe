//! Authentication primitives
//!
//! Provides argon2 password hashing, the signed-token codec, and the
//! request extractor that checks the session registry.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, TokenCodec};
pub use middleware::CurrentUser;
pub use password::PasswordService;
