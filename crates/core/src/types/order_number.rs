//! Human-readable order numbers.
//!
//! Format: `FS-YYYYMMDD-XXXXX`, where the suffix is five characters from an
//! alphabet without look-alikes (no `0/O`, `1/I`). Customers read these out
//! over WhatsApp, so they must survive being typed by hand.

use core::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const PREFIX: &str = "FS";
const SUFFIX_LEN: usize = 5;
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A unique, human-readable order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a new order number for an order placed at `placed_at`.
    #[must_use]
    pub fn generate(placed_at: DateTime<Utc>) -> Self {
        Self::generate_with(placed_at, &mut rand::rng())
    }

    /// Generate using a caller-supplied RNG.
    pub fn generate_with<R: Rng + ?Sized>(placed_at: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ALPHABET.len());
                char::from(ALPHABET.get(idx).copied().unwrap_or(b'X'))
            })
            .collect();
        Self(format!("{PREFIX}-{}-{suffix}", placed_at.format("%Y%m%d")))
    }

    /// Wrap a number that was already issued (e.g. read back from the store).
    #[must_use]
    pub const fn from_existing(value: String) -> Self {
        Self(value)
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
