//! Prices.
//!
//! The backend sends prices as decimal strings (`"100.00"`). Every arithmetic
//! boundary must go through [`Price`] so a malformed price fails loudly
//! instead of silently turning into zero.

use core::str::FromStr;

use rust_decimal::Decimal;

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Non-negative unit price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation(format!(
                "price cannot be negative: {amount}"
            )));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Line amount for `quantity` units; fails instead of overflowing.
    pub fn times(&self, quantity: u32) -> Result<Decimal, DomainError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| DomainError::overflow(format!("{} x {quantity}", self.0)))
    }
}

impl ValueObject for Price {}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let amount = Decimal::from_str(raw)
            .map_err(|e| DomainError::validation(format!("invalid price {raw:?}: {e}")))?;
        Self::new(amount)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        let price: Price = "100.00".parse().unwrap();
        assert_eq!(price.amount(), Decimal::new(10000, 2));
        assert_eq!(price, "100".parse::<Price>().unwrap());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let price: Price = " 49.50 ".parse().unwrap();
        assert_eq!(price.times(2).unwrap(), Decimal::new(9900, 2));
    }

    #[test]
    fn rejects_non_numeric_input() {
        for raw in ["", "abc", "12,50", "NaN"] {
            let err = raw.parse::<Price>().unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{raw:?} should fail");
        }
    }

    #[test]
    fn rejects_negative_prices() {
        assert!("-1.00".parse::<Price>().is_err());
        assert_eq!("0".parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn times_reports_overflow() {
        let price = Price::new(Decimal::MAX).unwrap();
        assert_eq!(price.times(1).unwrap(), Decimal::MAX);
        assert!(matches!(price.times(2), Err(DomainError::Overflow(_))));
    }

    #[test]
    fn displays_two_decimal_places() {
        let price: Price = "250".parse().unwrap();
        assert_eq!(price.to_string(), "250.00");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: line amount is linear in quantity.
            #[test]
            fn times_is_linear(cents in 0u64..10_000_000, qty in 0u32..1_000) {
                let price = Price::new(Decimal::new(cents as i64, 2)).unwrap();
                let line = price.times(qty).unwrap();
                prop_assert_eq!(line, price.amount() * Decimal::from(qty));
                prop_assert_eq!(price.times(qty + 1).unwrap() - line, price.amount());
            }
        }
    }
}
