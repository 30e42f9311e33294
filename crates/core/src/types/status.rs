//! Order status lifecycle.
//!
//! The happy path is `received` → `dispatched` → `completed`, with `returned`
//! and `cancelled` as side branches. Staff may set any status at any time
//! (manual corrections are common), so no transition is rejected here.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed and is being processed.
    #[default]
    Received,
    /// Order is on its way to the customer.
    Dispatched,
    /// Order was delivered.
    Completed,
    /// Order came back to the store.
    Returned,
    /// Order was cancelled.
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle display order.
    pub const ALL: [Self; 5] = [
        Self::Received,
        Self::Dispatched,
        Self::Completed,
        Self::Returned,
        Self::Cancelled,
    ];

    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable label for select boxes and headings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Dispatched => "Dispatched",
            Self::Completed => "Completed",
            Self::Returned => "Returned",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Display filter for the admin order list: everything, or a single status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Show every status group that has orders.
    #[default]
    All,
    /// Show only this status group, even when empty.
    Only(OrderStatus),
}

impl StatusFilter {
    /// Query-string representation (`all` or a status).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "all" {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}
