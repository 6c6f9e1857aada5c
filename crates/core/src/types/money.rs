//! Monetary amounts backed by decimal arithmetic.
//!
//! The store runs in a single currency, so `Money` wraps a bare
//! [`Decimal`] amount. Construction rejects negative values; arithmetic that
//! could overflow uses the checked `Decimal` operations.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The amount was negative.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative monetary amount.
///
/// Serialized as a decimal string (`"19.99"`) to avoid floating-point
/// round-tripping; deserialization accepts numbers or strings and rejects
/// negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` value, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a line-item quantity.
    ///
    /// Saturates at `Decimal::MAX` on overflow, which is unreachable for any
    /// realistic price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.amount()
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database CHECK constraints keep stored amounts non-negative
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_accepts_zero_and_positive() {
        assert!(Money::new(Decimal::ZERO).is_ok());
        assert!(Money::new(dec("19.99")).is_ok());
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(
            Money::new(dec("-0.01")),
            Err(MoneyError::Negative(_))
        ));
    }

    #[test]
    fn test_times_scales_unit_price() {
        let unit = Money::new(dec("100")).unwrap();
        assert_eq!(unit.times(2).amount(), dec("200"));
        assert_eq!(unit.times(0).amount(), Decimal::ZERO);
    }

    #[test]
    fn test_sum_of_line_totals() {
        let items = [
            Money::new(dec("100")).unwrap().times(2),
            Money::new(dec("24.50")).unwrap().times(1),
        ];
        let total: Money = items.into_iter().sum();
        assert_eq!(total.amount(), dec("224.50"));
    }

    #[test]
    fn test_serde_as_decimal_string() {
        let money = Money::new(dec("19.99")).unwrap();
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"19.99\"");

        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_rejects_negatives() {
        let from_number: Money = serde_json::from_str("200").unwrap();
        assert_eq!(from_number.amount(), dec("200"));

        assert!(serde_json::from_str::<Money>("-5").is_err());
    }
}
