//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod amount;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId};
pub use amount::{Amount, AmountError, Balance};
pub use error::DomainError;
pub use transaction::{TransactionKind, TransactionRecord, UnknownTransactionKind};
