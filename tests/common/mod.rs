//! Common test utilities

#![allow(dead_code)]

use std::path::PathBuf;

use ledger_engine::{AccountId, Config, Ledger};
use rust_decimal::Decimal;

/// Fresh ledger on a private in-memory database with migrations applied
pub async fn setup_ledger() -> Ledger {
    Ledger::connect(&Config::new("sqlite::memory:"))
        .await
        .expect("Failed to open in-memory ledger")
}

/// Fresh ledger on a throwaway database file, for tests that need several
/// connections at once
pub async fn setup_file_ledger(max_connections: u32) -> (Ledger, TempDb) {
    let db = TempDb::new();
    let mut config = Config::new(format!("sqlite://{}", db.path.display()));
    config.database_max_connections = max_connections;

    let ledger = Ledger::connect(&config)
        .await
        .expect("Failed to open file-backed ledger");
    (ledger, db)
}

/// Open an account and credit it with `amount`
pub async fn funded_account(ledger: &Ledger, amount: Decimal) -> AccountId {
    let id = ledger.open_account().await.expect("Failed to open account");
    ledger
        .credit(id, amount)
        .await
        .expect("Failed to fund account");
    id
}

/// Database file removed (with its WAL side files) on drop
pub struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("ledger-test-{}.db", uuid::Uuid::new_v4()));
        Self { path }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
