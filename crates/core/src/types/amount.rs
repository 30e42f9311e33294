//! Non-negative monetary amounts in rupees.
//!
//! Prices and totals are kept as [`Decimal`] so that `2 × 99.90` is exactly
//! `199.80`. On the wire they travel as JSON numbers, which is what the email
//! functions and the storefront clients expect.
//!
//! Every `Amount` fits a `NUMERIC(12, 2)` column: at most two decimal places
//! and no more than [`Amount::MAX`]. Arithmetic is checked against the same
//! bound.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when constructing an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Amounts cannot be negative.
    #[error("amount cannot be negative (got {0})")]
    Negative(Decimal),
    /// Larger than [`Amount::MAX`].
    #[error("amount {0} exceeds the maximum of {max}", max = Amount::MAX)]
    TooLarge(Decimal),
    /// More than two decimal places.
    #[error("amount {0} has more than two decimal places")]
    TooPrecise(Decimal),
}

/// A non-negative amount of money (INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest storable amount, `9999999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2));

    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Negative`] if `value < 0`,
    /// [`AmountError::TooLarge`] above [`Amount::MAX`], or
    /// [`AmountError::TooPrecise`] with more than two decimal places.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value > Self::MAX.0 {
            return Err(AmountError::TooLarge(value));
        }
        if value.normalize().scale() > 2 {
            return Err(AmountError::TooPrecise(value));
        }
        Ok(Self(value))
    }

    /// Whole-rupee amount.
    #[must_use]
    pub fn from_rupees(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity. `None` if the result would
    /// exceed [`Amount::MAX`].
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .and_then(|value| Self::new(value).ok())
    }

    /// Add two amounts. `None` if the result would exceed [`Amount::MAX`].
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0
            .checked_add(rhs.0)
            .and_then(|value| Self::new(value).ok())
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format with the rupee sign, e.g. `₹1499.5`.
    #[must_use]
    pub fn display_rupees(&self) -> String {
        format!("₹{self}")
    }
}

impl fmt::Display for Amount {
    /// Shortest representation: `100` rather than `100.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0.normalize(), serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Amount {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Amount {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let decimal = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(decimal)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Amount {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
