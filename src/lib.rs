//! ledger_engine Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod handlers;
pub mod ledger;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse, LedgerError, LedgerResult};
pub use domain::{Account, AccountId, Amount, AmountError, Balance, DomainError};
pub use domain::{TransactionKind, TransactionRecord};
pub use ledger::Ledger;
