//! Order and line item records.
//!
//! These are the typed shapes of rows in the order store. Everything that
//! crosses the store boundary goes through them, so a malformed row is
//! rejected once at the edge instead of surfacing as a missing field later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Amount, Email, EmailError, OrderId, OrderItemId, OrderNumber, OrderStatus};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable number quoted to the customer.
    pub order_number: OrderNumber,
    pub customer_name: String,
    /// Optional: orders taken over WhatsApp often have no email.
    pub customer_email: Option<Email>,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    /// Supplied at creation; not recomputed from items.
    pub total: Amount,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One product/quantity/price entry belonging to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// Free-text copy of the product name at the time of ordering.
    pub product_name: String,
    /// Always at least 1.
    pub quantity: u32,
    /// Unit price.
    pub price: Amount,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Quantity × unit price.
    ///
    /// A plain [`Decimal`]: the product of a stored price and quantity always
    /// fits a `Decimal`, but not necessarily an [`Amount`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.as_decimal() * Decimal::from(self.quantity)
    }
}

/// Fields required to insert an order. The store assigns id, order number
/// and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Option<Email>,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub total: Amount,
    pub status: OrderStatus,
}

/// Fields required to insert a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Amount,
}

/// Problems with a manually entered order.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OrderDraftError {
    #[error("customer name is required")]
    MissingCustomerName,
    #[error("invalid customer email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("an order needs at least one item")]
    NoItems,
    #[error("item {line}: product name is required")]
    MissingProductName { line: usize },
    #[error("item {line}: quantity must be at least 1")]
    ZeroQuantity { line: usize },
    #[error("order total exceeds the maximum of {max}", max = Amount::MAX)]
    TotalTooLarge,
}

/// One line of a manually entered order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftLine {
    pub product_name: String,
    pub quantity: u32,
    pub price: Amount,
}

impl DraftLine {
    /// Attach this line to a freshly created order.
    #[must_use]
    pub fn for_order(&self, order_id: OrderId) -> NewOrderItem {
        NewOrderItem {
            order_id,
            product_name: self.product_name.trim().to_string(),
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// A manual order as entered by staff in the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: String,
    pub items: Vec<DraftLine>,
}

impl OrderDraft {
    /// Σ quantity × price over the entered lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDraftError::TotalTooLarge`] if a line total or the sum
    /// exceeds [`Amount::MAX`].
    pub fn total(&self) -> Result<Amount, OrderDraftError> {
        self.items.iter().try_fold(Amount::ZERO, |acc, line| {
            line.price
                .checked_times(line.quantity)
                .and_then(|line_total| acc.checked_add(line_total))
                .ok_or(OrderDraftError::TotalTooLarge)
        })
    }

    /// Validate the draft and split it into the order row (status `received`,
    /// total derived from the lines) and the lines to insert afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first validation problem found.
    pub fn into_parts(self) -> Result<(NewOrder, Vec<DraftLine>), OrderDraftError> {
        let customer_name = self.customer_name.trim();
        if customer_name.is_empty() {
            return Err(OrderDraftError::MissingCustomerName);
        }
        let customer_email = Email::parse_optional(Some(&self.customer_email))?;

        if self.items.is_empty() {
            return Err(OrderDraftError::NoItems);
        }
        for (idx, line) in self.items.iter().enumerate() {
            let line_no = idx + 1;
            if line.product_name.trim().is_empty() {
                return Err(OrderDraftError::MissingProductName { line: line_no });
            }
            if line.quantity == 0 {
                return Err(OrderDraftError::ZeroQuantity { line: line_no });
            }
        }

        let total = self.total()?;
        let notes = Some(self.notes.trim().to_string()).filter(|n| !n.is_empty());

        let order = NewOrder {
            customer_name: customer_name.to_string(),
            customer_email,
            customer_phone: self.customer_phone.trim().to_string(),
            delivery_address: self.delivery_address.trim().to_string(),
            notes,
            total,
            status: OrderStatus::Received,
        };
        Ok((order, self.items))
    }
}
