//! Wire payloads for the email functions.
//!
//! The admin dispatcher serializes these and the mailer deserializes them, so
//! both sides share one definition of the JSON contract:
//!
//! ```json
//! {
//!   "customerEmail": "asha@plants.in",
//!   "customerName": "Asha",
//!   "orderNumber": "FS-20260307-K7Q2M",
//!   "status": "dispatched",
//!   "items": [{ "product_name": "Monstera", "quantity": 2, "price": 100 }],
//!   "total": 200
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderItem};
use crate::types::{Amount, OrderStatus};

/// A line item as carried in an order email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLineItem {
    pub product_name: String,
    pub quantity: u32,
    pub price: Amount,
}

impl From<&OrderItem> for EmailLineItem {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Request body for the order status email function.
///
/// `status` stays a plain string: the mailer renders a generic update for any
/// status it does not recognise instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmailPayload {
    pub customer_email: String,
    pub customer_name: String,
    pub order_number: String,
    pub status: String,
    #[serde(default)]
    pub items: Option<Vec<EmailLineItem>>,
    #[serde(default)]
    pub total: Option<Amount>,
}

impl OrderEmailPayload {
    /// Build the payload for `order` with the given items and target status.
    ///
    /// Returns `None` when the order has no customer email to send to.
    #[must_use]
    pub fn for_order(order: &Order, items: &[OrderItem], status: OrderStatus) -> Option<Self> {
        let customer_email = order.customer_email.as_ref()?;
        Some(Self {
            customer_email: customer_email.to_string(),
            customer_name: order.customer_name.clone(),
            order_number: order.order_number.to_string(),
            status: status.to_string(),
            items: Some(items.iter().map(EmailLineItem::from).collect()),
            total: Some(order.total),
        })
    }
}

/// Request body for the contact form email function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{Email, OrderId, OrderItemId, OrderNumber};

    fn order(email: Option<&str>) -> Order {
        Order {
            id: OrderId::random(),
            order_number: OrderNumber::from_existing("FS-20260307-K7Q2M".to_string()),
            customer_name: "Asha".to_string(),
            customer_email: email.map(|e| Email::parse(e).unwrap()),
            customer_phone: "+91 98765 43210".to_string(),
            delivery_address: "Pune".to_string(),
            notes: None,
            total: Amount::from_rupees(200),
            status: OrderStatus::Received,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_wire_field_names() {
        let o = order(Some("asha@plants.in"));
        let items = vec![OrderItem {
            id: OrderItemId::random(),
            order_id: o.id,
            product_name: "Monstera".to_string(),
            quantity: 2,
            price: Amount::from_rupees(100),
            created_at: Utc::now(),
        }];
        let payload = OrderEmailPayload::for_order(&o, &items, OrderStatus::Dispatched).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["customerEmail"], "asha@plants.in");
        assert_eq!(json["customerName"], "Asha");
        assert_eq!(json["orderNumber"], "FS-20260307-K7Q2M");
        assert_eq!(json["status"], "dispatched");
        assert_eq!(json["items"][0]["product_name"], "Monstera");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["total"].as_f64(), Some(200.0));
    }

    #[test]
    fn test_no_payload_without_email() {
        assert!(OrderEmailPayload::for_order(&order(None), &[], OrderStatus::Received).is_none());
    }

    #[test]
    fn test_items_and_total_are_optional_on_input() {
        let payload: OrderEmailPayload = serde_json::from_str(
            r#"{"customerEmail":"a@b.in","customerName":"A","orderNumber":"FS-1","status":"weird"}"#,
        )
        .unwrap();
        assert!(payload.items.is_none());
        assert!(payload.total.is_none());
        assert_eq!(payload.status, "weird");
    }
}
