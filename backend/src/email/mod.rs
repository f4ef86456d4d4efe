//! Outbound email capability
//!
//! The authentication core sends exactly one kind of message: the email
//! verification link. Delivery failure handling differs by call site and
//! is therefore an explicit argument: registration and the
//! login-while-unverified path log the failure and continue, while the
//! dedicated resend endpoint surfaces it to the caller.

use async_trait::async_trait;
use thiserror::Error;

mod smtp;

pub use smtp::SmtpMailer;

/// Delivery failures
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("failed to build message: {0}")]
    Message(String),

    #[error("smtp transport error: {0}")]
    Transport(String),
}

/// What a call site does when delivery fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Log the failure and continue; the primary operation still succeeds.
    BestEffort,
    /// Propagate the failure to the caller.
    Surface,
}

/// Template context for the verification message.
#[derive(Debug, Clone)]
pub struct VerificationEmail {
    pub subject: String,
    pub recipient: String,
    pub full_name: String,
    pub verification_link: String,
}

/// Email delivery capability.
///
/// Production wiring uses [`SmtpMailer`]; the test suites substitute a
/// recording implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &VerificationEmail) -> Result<(), EmailError>;
}
