//! Ledger Store module
//!
//! Persistence layer: connection pool, atomic scopes and account rows.

mod repository;
mod scope;

pub use repository::LedgerStore;
pub use scope::AtomicScope;
