//! Order status and contact form email sending.

use std::sync::Arc;

use friends_store_core::{ContactMessage, OrderEmailPayload};

use crate::config::{ContactSettings, EnvSource, SmtpSettings};
use crate::error::EmailError;
use crate::services::transport::{MailTransport, OutgoingEmail};
use crate::templates::{render_contact_email, render_order_email};

/// Sends transactional email.
///
/// SMTP settings are looked up on every call, before any rendering or
/// connection attempt, so a missing variable fails the request immediately.
#[derive(Clone)]
pub struct EmailSender {
    env: Arc<dyn EnvSource>,
    transport: Arc<dyn MailTransport>,
}

impl EmailSender {
    /// Create a sender reading settings from `env` and delivering via `transport`.
    pub fn new(env: Arc<dyn EnvSource>, transport: Arc<dyn MailTransport>) -> Self {
        Self { env, transport }
    }

    /// Send the status notification for an order to its customer.
    ///
    /// # Errors
    ///
    /// Returns an error if SMTP settings are incomplete, the recipient address
    /// is invalid, or delivery fails.
    pub async fn send_order_email(&self, payload: &OrderEmailPayload) -> Result<(), EmailError> {
        let smtp = SmtpSettings::load(self.env.as_ref())?;
        let content = render_order_email(payload)?;

        tracing::info!(
            order_number = %payload.order_number,
            status = %payload.status,
            "Sending order status email"
        );

        self.transport
            .send(
                &smtp,
                OutgoingEmail {
                    from: smtp.from_address.clone(),
                    to: payload.customer_email.clone(),
                    content,
                },
            )
            .await
    }

    /// Forward a contact form submission to the store's inbox.
    ///
    /// # Errors
    ///
    /// Returns an error if SMTP settings are incomplete or delivery fails.
    pub async fn send_contact_email(&self, message: &ContactMessage) -> Result<(), EmailError> {
        let settings = ContactSettings::load(self.env.as_ref())?;
        let content = render_contact_email(message)?;

        tracing::info!(from = %message.email, "Forwarding contact form message");

        self.transport
            .send(
                &settings.smtp,
                OutgoingEmail {
                    from: settings.smtp.from_address.clone(),
                    to: settings.to_address.clone(),
                    content,
                },
            )
            .await
    }
}
