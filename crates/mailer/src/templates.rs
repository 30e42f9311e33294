//! Email content: subject lines, status copy and rendered bodies.

use askama::Template;
use friends_store_core::{Amount, ContactMessage, OrderEmailPayload};

use crate::error::EmailError;

/// Subject and body copy for an order status email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub subject: &'static str,
    pub body: &'static str,
}

/// Copy for each known status. Anything else gets a generic update.
#[must_use]
pub fn status_message(status: &str) -> StatusMessage {
    match status {
        "received" => StatusMessage {
            subject: "Order Confirmed - Friends Store",
            body: "Your order has been received and is being processed. We'll notify you when it ships.",
        },
        "dispatched" => StatusMessage {
            subject: "Order Shipped - Friends Store",
            body: "Great news! Your order has been dispatched and is on its way to you.",
        },
        "completed" => StatusMessage {
            subject: "Order Delivered - Friends Store",
            body: "Your order has been successfully delivered. Thank you for shopping with Friends Store!",
        },
        "returned" => StatusMessage {
            subject: "Order Return Processed - Friends Store",
            body: "Your order return has been processed. Please contact us if you have any questions.",
        },
        "cancelled" => StatusMessage {
            subject: "Order Cancelled - Friends Store",
            body: "Your order has been cancelled. If you didn't request this, please contact us immediately.",
        },
        _ => StatusMessage {
            subject: "Order Update - Friends Store",
            body: "Your order status has been updated.",
        },
    }
}

struct ItemRow {
    product_name: String,
    quantity: u32,
    price: String,
}

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusEmailHtml<'a> {
    subject: &'a str,
    customer_name: &'a str,
    body: &'a str,
    order_number: &'a str,
    status: &'a str,
    items: &'a [ItemRow],
    total: Option<String>,
}

#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusEmailText<'a> {
    customer_name: &'a str,
    body: &'a str,
    order_number: &'a str,
    status: &'a str,
    items: &'a [ItemRow],
    total: Option<String>,
}

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmailHtml<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactEmailText<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// A fully rendered email, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render the status notification for an order.
///
/// The items table only appears when the payload carries at least one item,
/// and its total row only when a total is present.
///
/// # Errors
///
/// Returns `EmailError::Template` if rendering fails.
pub fn render_order_email(payload: &OrderEmailPayload) -> Result<RenderedEmail, EmailError> {
    let copy = status_message(&payload.status);
    let items: Vec<ItemRow> = payload
        .items
        .iter()
        .flatten()
        .map(|item| ItemRow {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price.display_rupees(),
        })
        .collect();
    let total = payload.total.as_ref().map(Amount::display_rupees);

    let html = OrderStatusEmailHtml {
        subject: copy.subject,
        customer_name: &payload.customer_name,
        body: copy.body,
        order_number: &payload.order_number,
        status: &payload.status,
        items: &items,
        total: total.clone(),
    }
    .render()?;
    let text = OrderStatusEmailText {
        customer_name: &payload.customer_name,
        body: copy.body,
        order_number: &payload.order_number,
        status: &payload.status,
        items: &items,
        total,
    }
    .render()?;

    Ok(RenderedEmail {
        subject: copy.subject.to_string(),
        text,
        html,
    })
}

/// Render a contact form submission for the store owner.
///
/// # Errors
///
/// Returns `EmailError::Template` if rendering fails.
pub fn render_contact_email(message: &ContactMessage) -> Result<RenderedEmail, EmailError> {
    let html = ContactEmailHtml {
        name: &message.name,
        email: &message.email,
        subject: &message.subject,
        message: &message.message,
    }
    .render()?;
    let text = ContactEmailText {
        name: &message.name,
        email: &message.email,
        subject: &message.subject,
        message: &message.message,
    }
    .render()?;

    Ok(RenderedEmail {
        subject: format!("New contact message: {}", message.subject),
        text,
        html,
    })
}
