//! Account Registry
//!
//! Opens accounts under fresh random 10-digit numbers.

use crate::domain::{Account, AccountId, Balance};
use crate::error::{LedgerError, LedgerResult};
use crate::store::LedgerStore;

/// Creates accounts and answers existence checks
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    store: LedgerStore,
}

impl AccountRegistry {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Open a new account with a zero balance.
    ///
    /// Draws candidate numbers until one is free. The primary key decides
    /// races with a concurrent `open`, so a lost race is just another
    /// collision.
    pub async fn open(&self) -> LedgerResult<AccountId> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let candidate = AccountId::random(&mut rand::thread_rng());

            if self.store.account_exists(candidate).await? {
                tracing::debug!(account_id = %candidate, "Account number taken, drawing again");
                continue;
            }

            if self.store.insert_account(candidate).await? {
                tracing::info!(account_id = %candidate, attempts, "Account opened");
                return Ok(candidate);
            }

            tracing::debug!(account_id = %candidate, "Account number claimed concurrently, drawing again");
        }
    }

    pub async fn exists(&self, id: AccountId) -> LedgerResult<bool> {
        self.store.account_exists(id).await
    }

    /// Load an account with its current balance
    pub async fn account(&self, id: AccountId) -> LedgerResult<Account> {
        let minor = self
            .store
            .fetch_balance(id)
            .await?
            .ok_or_else(|| LedgerError::account_not_found(id))?;

        Ok(Account {
            id,
            balance: Balance::from_minor_units(minor)?,
        })
    }
}
