//! Mail transports.
//!
//! [`SmtpTransport`] delivers through lettre. [`OutboxTransport`] keeps
//! messages in memory; the binary uses it for `MAILER_DRY_RUN` and the tests
//! use it to inspect what would have been sent.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;

use crate::config::SmtpSettings;
use crate::error::EmailError;
use crate::templates::RenderedEmail;

/// A message addressed and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub content: RenderedEmail,
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message with the given SMTP settings.
    async fn send(&self, smtp: &SmtpSettings, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// SMTP delivery through lettre.
///
/// A connection is built per message from the settings read for that
/// request. Port 465 uses implicit TLS; every other port uses STARTTLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpTransport;

impl SmtpTransport {
    fn mailer(smtp: &SmtpSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let credentials = Credentials::new(
            smtp.username.clone(),
            smtp.password.expose_secret().to_string(),
        );
        let builder = if smtp.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        };
        Ok(builder.port(smtp.port).credentials(credentials).build())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

/// Build a multipart message with plain text and HTML alternatives.
///
/// # Errors
///
/// Returns an error if either address does not parse.
pub fn build_message(email: &OutgoingEmail) -> Result<Message, EmailError> {
    let message = Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.content.subject.as_str())
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.content.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.content.html.clone()),
                ),
        )?;
    Ok(message)
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, smtp: &SmtpSettings, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = build_message(&email)?;
        Self::mailer(smtp)?.send(message).await?;

        tracing::info!(
            to = %email.to,
            subject = %email.content.subject,
            "Email sent successfully"
        );
        Ok(())
    }
}

/// In-memory transport that records every message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct OutboxTransport {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl OutboxTransport {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MailTransport for OutboxTransport {
    async fn send(&self, smtp: &SmtpSettings, email: OutgoingEmail) -> Result<(), EmailError> {
        // Same address validation as a real send.
        build_message(&email)?;

        tracing::info!(
            smtp_host = %smtp.host,
            to = %email.to,
            subject = %email.content.subject,
            "Email recorded (dry run)"
        );
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            from: "orders@friendsstore.in".to_string(),
            to: to.to_string(),
            content: RenderedEmail {
                subject: "Order Shipped - Friends Store".to_string(),
                text: "shipped".to_string(),
                html: "<p>shipped</p>".to_string(),
            },
        }
    }

    #[test]
    fn test_build_message_sets_headers() {
        let message = build_message(&email("asha@plants.in")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: asha@plants.in"));
        assert!(raw.contains("Subject: Order Shipped - Friends Store"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        assert!(matches!(
            build_message(&email("not an address")),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
