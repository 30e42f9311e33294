//! Customer notification dispatcher.
//!
//! After an order is created or its status changes, [`OrderNotifier::notify`]
//! loads the order and its items, builds the email payload and posts it to
//! the order email function. Notification is best effort: nothing here can
//! fail the mutation that triggered it. Every problem is logged as a warning
//! and reported back as a [`NotifyOutcome`].

use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use friends_store_core::{OrderEmailPayload, OrderId, OrderStatus};

use crate::db::{OrderStore, RepositoryError};

/// Path of the order email function under the functions host.
const SEND_ORDER_EMAIL_PATH: &str = "/send-order-email";

/// Result of a notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The email function accepted the request.
    Sent,
    /// No request was made.
    Skipped(SkipReason),
    /// The attempt failed; the message describes why.
    Failed(String),
}

/// Why a notification was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither an explicit endpoint nor a base service URL is configured.
    NoEndpoint,
    /// The order does not exist (e.g. deleted in the meantime).
    OrderNotFound,
    /// The order has no customer email address.
    NoCustomerEmail,
}

impl NotifyOutcome {
    /// Whether the email function accepted the request.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Internal notification errors. Never escape [`OrderNotifier::notify`].
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to load order: {0}")]
    LoadOrder(#[source] RepositoryError),

    #[error("failed to load order items: {0}")]
    LoadItems(#[source] RepositoryError),

    #[error("request to email function failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email function returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Work out where order emails are posted.
///
/// An explicit endpoint wins. Otherwise the functions host is derived from
/// the base service URL by replacing `.supabase.co` with
/// `.functions.supabase.co`, and `/send-order-email` is appended. Returns
/// `None` when neither is configured or the result is not a valid URL.
#[must_use]
pub fn resolve_endpoint(explicit: Option<&str>, base_url: Option<&str>) -> Option<Url> {
    let explicit = explicit.map(str::trim).filter(|s| !s.is_empty());
    let raw = if let Some(endpoint) = explicit {
        endpoint.to_string()
    } else {
        let base = base_url.map(str::trim).filter(|s| !s.is_empty())?;
        let functions_base = base
            .trim_end_matches('/')
            .replacen(".supabase.co", ".functions.supabase.co", 1);
        format!("{functions_base}{SEND_ORDER_EMAIL_PATH}")
    };

    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(endpoint = %raw, error = %e, "Ignoring invalid notification endpoint");
            None
        }
    }
}

/// Sends order status notifications.
#[derive(Clone)]
pub struct OrderNotifier {
    store: Arc<dyn OrderStore>,
    client: Client,
    endpoint: Option<Url>,
}

impl OrderNotifier {
    /// Create a notifier. With no endpoint every call is skipped.
    pub fn new(store: Arc<dyn OrderStore>, client: Client, endpoint: Option<Url>) -> Self {
        if endpoint.is_none() {
            tracing::warn!(
                "No notification endpoint configured (SEND_ORDER_EMAIL_URL / SUPABASE_URL); \
                 customer emails are disabled"
            );
        }
        Self {
            store,
            client,
            endpoint,
        }
    }

    /// The resolved endpoint, if any.
    #[must_use]
    pub const fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Notify the customer that `order_id` now has `status`.
    ///
    /// Never fails; the outcome is returned for the caller to log or ignore.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn notify(&self, order_id: OrderId, status: OrderStatus) -> NotifyOutcome {
        match self.try_notify(order_id, status).await {
            Ok(outcome) => {
                if let NotifyOutcome::Skipped(reason) = &outcome {
                    tracing::warn!(?reason, "Order notification skipped");
                } else {
                    tracing::info!("Order notification sent");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(error = %e, "Order notification failed");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_notify(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<NotifyOutcome, NotifyError> {
        let (order, items) = tokio::join!(
            self.store.get_order(order_id),
            self.store.list_items(order_id)
        );
        let order = order.map_err(NotifyError::LoadOrder)?;
        let items = items.map_err(NotifyError::LoadItems)?;

        let Some(order) = order else {
            return Ok(NotifyOutcome::Skipped(SkipReason::OrderNotFound));
        };
        let Some(endpoint) = &self.endpoint else {
            return Ok(NotifyOutcome::Skipped(SkipReason::NoEndpoint));
        };
        let Some(payload) = OrderEmailPayload::for_order(&order, &items, status) else {
            return Ok(NotifyOutcome::Skipped(SkipReason::NoCustomerEmail));
        };

        let response = self
            .client
            .post(endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        let code = response.status();
        if !code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: code.as_u16(),
                body,
            });
        }

        Ok(NotifyOutcome::Sent)
    }
}
