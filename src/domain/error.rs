//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use super::{AccountId, AmountError};

/// Business rule violations reported by ledger operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// No account with this number
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Negative, too precise, or too large amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Balance would go negative
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    /// Transfer to same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds { required, available }
    }
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(dec!(150.00), dec!(100.00));

        assert!(err.to_string().contains("150.00"));
        assert!(err.to_string().contains("100.00"));
    }

    #[test]
    fn test_account_not_found_message() {
        let err = DomainError::AccountNotFound(AccountId::new(1_234_567_890));
        assert_eq!(err.to_string(), "Account not found: 1234567890");
    }

    #[test]
    fn test_amount_error_becomes_invalid_amount() {
        let err: DomainError = AmountError::TooManyDecimals(3).into();
        assert!(matches!(err, DomainError::InvalidAmount(ref msg) if msg.contains("decimal")));
    }
}
