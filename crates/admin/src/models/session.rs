//! Session-stored admin identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in operator.
///
/// Written to the session at sign-in and handed to handlers by
/// `RequireAdminAuth`; cleared at sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Operator's display name, used in logs.
    pub name: String,
    pub signed_in_at: DateTime<Utc>,
}

impl CurrentAdmin {
    /// Identity for an operator signing in now.
    #[must_use]
    pub fn signed_in_now(name: &str) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() {
                "admin".to_string()
            } else {
                name.to_string()
            },
            signed_in_at: Utc::now(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_defaults() {
        assert_eq!(CurrentAdmin::signed_in_now("  ").name, "admin");
        assert_eq!(CurrentAdmin::signed_in_now(" Priya ").name, "Priya");
    }
}
