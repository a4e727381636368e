//! Command Handlers module
//!
//! Ledger operations: the account registry, single-account balance
//! operations and the two-account transfer coordinator.

mod balance_handler;
mod commands;
mod registry;
mod transfer_handler;

pub use balance_handler::BalanceOperations;
pub use commands::*;
pub use registry::AccountRegistry;
pub use transfer_handler::TransferCoordinator;
