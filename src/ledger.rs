//! Ledger facade
//!
//! One handle over the registry, balance operations, transfer coordinator
//! and audit logger, all sharing the same store.

use rust_decimal::Decimal;

use crate::audit::{AuditLogger, ChainVerification, History};
use crate::config::Config;
use crate::domain::{Account, AccountId, Balance};
use crate::error::LedgerResult;
use crate::handlers::{
    AccountRegistry, BalanceOperations, TransferCommand, TransferCoordinator, TransferReceipt,
};
use crate::store::LedgerStore;

/// Entry point for callers of the ledger
#[derive(Debug, Clone)]
pub struct Ledger {
    store: LedgerStore,
    registry: AccountRegistry,
    balances: BalanceOperations,
    transfers: TransferCoordinator,
    audit: AuditLogger,
}

impl Ledger {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            registry: AccountRegistry::new(store.clone()),
            balances: BalanceOperations::new(store.clone()),
            transfers: TransferCoordinator::new(store.clone()),
            audit: AuditLogger::new(store.clone()),
            store,
        }
    }

    /// Open the configured store (running migrations) and wrap it
    pub async fn connect(config: &Config) -> LedgerResult<Self> {
        Ok(Self::new(LedgerStore::open(config).await?))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn balances(&self) -> &BalanceOperations {
        &self.balances
    }

    pub fn transfers(&self) -> &TransferCoordinator {
        &self.transfers
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub async fn open_account(&self) -> LedgerResult<AccountId> {
        self.registry.open().await
    }

    pub async fn exists(&self, id: AccountId) -> LedgerResult<bool> {
        self.registry.exists(id).await
    }

    pub async fn account(&self, id: AccountId) -> LedgerResult<Account> {
        self.registry.account(id).await
    }

    pub async fn balance_of(&self, id: AccountId) -> LedgerResult<Balance> {
        self.balances.balance_of(id).await
    }

    pub async fn credit(&self, id: AccountId, amount: Decimal) -> LedgerResult<Balance> {
        self.balances.credit(id, amount).await
    }

    pub async fn debit(&self, id: AccountId, amount: Decimal) -> LedgerResult<Balance> {
        self.balances.debit(id, amount).await
    }

    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> LedgerResult<TransferReceipt> {
        self.transfers.transfer(from, to, amount).await
    }

    pub async fn execute_transfer(&self, command: TransferCommand) -> LedgerResult<TransferReceipt> {
        self.transfers.execute(command).await
    }

    pub fn history(&self, id: AccountId) -> History {
        self.audit.history(id)
    }

    pub async fn verify_chain(&self, id: AccountId) -> LedgerResult<ChainVerification> {
        self.audit.verify_chain(id).await
    }
}
