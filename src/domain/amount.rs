//! Amount type
//!
//! Domain primitives for monetary values. Amounts and balances are exact
//! decimals in the domain and are stored as integer minor units (cents),
//! so binary floating point never touches a balance.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed amount and balance (1 trillion)
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Decimal places kept by the ledger
pub const SCALE: u32 = 2;

/// Minor units per major unit (10^SCALE)
const MINOR_PER_MAJOR: i64 = 100;

/// Amount represents a validated, strictly positive monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - At most 2 decimal places
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use ledger_engine::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(10050, 2)).unwrap();
/// assert_eq!(amount.minor_units(), 10050);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max {SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 2 decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        check_scale_and_range(value)?;
        Ok(Self(value.normalize()))
    }

    /// Validate a caller-supplied amount for a balance operation.
    ///
    /// Negative values are rejected, zero yields `Ok(None)` (the ledger
    /// treats a zero-amount mutation as a no-op), anything else must be a
    /// valid `Amount`.
    pub fn requested(value: Decimal) -> Result<Option<Self>, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }
        if value.is_zero() {
            return Ok(None);
        }
        Self::new(value).map(Some)
    }

    /// Rebuild an amount from stored minor units.
    pub fn from_minor_units(minor: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::new(minor, SCALE))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Value in minor units, as persisted by the store.
    pub fn minor_units(&self) -> i64 {
        to_minor_units(self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s.trim()).map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

/// Balance represents an account balance (zero or positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(Decimal);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }
        check_scale_and_range(value)?;
        Ok(Self(with_ledger_scale(value)))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(Decimal::new(0, SCALE))
    }

    /// Rebuild a balance from stored minor units.
    pub fn from_minor_units(minor: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::new(minor, SCALE))
    }

    /// Get the underlying value (always carries 2 decimal places)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Value in minor units, as persisted by the store.
    pub fn minor_units(&self) -> i64 {
        to_minor_units(self.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

/// Largest balance or amount, in minor units.
pub(crate) fn max_minor_units() -> i64 {
    MAX_AMOUNT * MINOR_PER_MAJOR
}

fn check_scale_and_range(value: Decimal) -> Result<(), AmountError> {
    let normalized = value.normalize();
    if normalized.scale() > SCALE {
        return Err(AmountError::TooManyDecimals(normalized.scale()));
    }
    if normalized > Decimal::from(MAX_AMOUNT) {
        return Err(AmountError::Overflow);
    }
    Ok(())
}

fn with_ledger_scale(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(SCALE);
    value
}

// Callers have already bounded `value` to MAX_AMOUNT with at most SCALE
// decimals, so the product always fits an i64.
fn to_minor_units(value: Decimal) -> i64 {
    (value * Decimal::from(MINOR_PER_MAJOR))
        .trunc()
        .to_i64()
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100)).unwrap();
        assert_eq!(amount.value(), dec!(100));
        assert_eq!(amount.minor_units(), 10_000);
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-100));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        let amount = Amount::new(dec!(0.123));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(3))));
    }

    #[test]
    fn test_amount_trailing_zeros_are_not_extra_decimals() {
        let amount = Amount::new(dec!(12.5000)).unwrap();
        assert_eq!(amount.minor_units(), 1250);
    }

    #[test]
    fn test_amount_overflow() {
        let amount = Amount::new(dec!(1000000000000.01));
        assert!(matches!(amount, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_max_value_ok() {
        let amount = Amount::new(dec!(1000000000000)).unwrap();
        assert_eq!(amount.minor_units(), max_minor_units());
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = " 123.45 ".parse().unwrap();
        assert_eq!(amount.value(), dec!(123.45));

        let garbage: Result<Amount, _> = "12abc".parse();
        assert!(matches!(garbage, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_requested_amount() {
        assert_eq!(Amount::requested(dec!(0)), Ok(None));
        assert_eq!(Amount::requested(dec!(0.00)), Ok(None));
        assert!(matches!(
            Amount::requested(dec!(-0.01)),
            Err(AmountError::Negative(_))
        ));
        let some = Amount::requested(dec!(5.25)).unwrap().unwrap();
        assert_eq!(some.minor_units(), 525);
    }

    #[test]
    fn test_minor_units_round_trip() {
        let amount = Amount::from_minor_units(999).unwrap();
        assert_eq!(amount.value(), dec!(9.99));
        assert!(Amount::from_minor_units(0).is_err());

        let balance = Balance::from_minor_units(0).unwrap();
        assert_eq!(balance.to_string(), "0.00");
    }

    #[test]
    fn test_balance_keeps_two_decimal_places() {
        let balance = Balance::new(dec!(50)).unwrap();
        assert_eq!(balance.value().to_string(), "50.00");
        assert_eq!(Balance::zero().value().to_string(), "0.00");
    }

    #[test]
    fn test_balance_rejects_negative() {
        assert!(matches!(
            Balance::new(dec!(-0.01)),
            Err(AmountError::Negative(_))
        ));
        assert_eq!(Balance::from_minor_units(7000).unwrap().value(), dec!(70.00));
    }
}
