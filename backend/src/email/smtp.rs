//! SMTP delivery via lettre

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailError, Mailer, VerificationEmail};
use crate::config::MailConfig;

/// Mailer backed by an async SMTP transport (STARTTLS).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport once at startup. The connection itself is
    /// established lazily on first send.
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid mail sender address: {}", e))?;

        Ok(Self { transport, from })
    }

    fn render_body(email: &VerificationEmail) -> String {
        format!(
            "<html><body>\
             <p>Hi {},</p>\
             <p>Please confirm your email address by following the link below:</p>\
             <p><a href=\"{}\">Verify your email</a></p>\
             <p>If you did not create an account, you can ignore this message.</p>\
             </body></html>",
            email.full_name, email.verification_link
        )
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &VerificationEmail) -> Result<(), EmailError> {
        let recipient: Mailbox = email
            .recipient
            .parse()
            .map_err(|e| EmailError::Message(format!("invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(Self::render_body(email))
            .map_err(|e| EmailError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| EmailError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_contains_link_and_name() {
        let email = VerificationEmail {
            subject: "Verify your email".to_string(),
            recipient: "jane@example.com".to_string(),
            full_name: "Jane Doe".to_string(),
            verification_link: "http://localhost:3000/verify-email?token=abc".to_string(),
        };
        let body = SmtpMailer::render_body(&email);
        assert!(body.contains("Jane Doe"));
        assert!(body.contains("verify-email?token=abc"));
    }
}
