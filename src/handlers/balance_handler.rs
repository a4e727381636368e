//! Balance Operations
//!
//! Credit and debit a single account. Each public operation runs in its own
//! atomic scope; the `apply_*` variants run inside a scope owned by the
//! caller so the Transfer Coordinator can compose them.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::audit::{AuditLogger, NewEntry};
use crate::domain::amount::max_minor_units;
use crate::domain::{AccountId, Amount, Balance, DomainError, TransactionKind};
use crate::error::{LedgerError, LedgerResult};
use crate::store::{AtomicScope, LedgerStore};

/// How a single balance change is recorded in the log
#[derive(Debug, Clone)]
pub(crate) struct Posting {
    pub kind: TransactionKind,
    pub description: String,
    pub transfer_id: Option<Uuid>,
}

impl Posting {
    pub fn new(kind: TransactionKind, description: String) -> Self {
        Self {
            kind,
            description,
            transfer_id: None,
        }
    }

    pub fn in_transfer(mut self, transfer_id: Uuid) -> Self {
        self.transfer_id = Some(transfer_id);
        self
    }

    fn entry(self, account_id: AccountId, amount: Amount) -> NewEntry {
        let entry = NewEntry::new(account_id, self.kind, amount).description(self.description);
        match self.transfer_id {
            Some(id) => entry.transfer_id(id),
            None => entry,
        }
    }
}

/// Credit, debit and balance reads for single accounts
#[derive(Debug, Clone)]
pub struct BalanceOperations {
    store: LedgerStore,
    audit: AuditLogger,
}

impl BalanceOperations {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            audit: AuditLogger::new(store.clone()),
            store,
        }
    }

    /// Current balance, read fresh from the store
    pub async fn balance_of(&self, id: AccountId) -> LedgerResult<Balance> {
        let minor = self
            .store
            .fetch_balance(id)
            .await?
            .ok_or_else(|| LedgerError::account_not_found(id))?;
        Ok(Balance::from_minor_units(minor)?)
    }

    /// Deposit `amount` and log a `CREDIT` entry. Returns the new balance.
    ///
    /// A zero amount changes nothing and writes no entry.
    pub async fn credit(&self, id: AccountId, amount: Decimal) -> LedgerResult<Balance> {
        let Some(amount) = Amount::requested(amount)? else {
            return self.balance_of(id).await;
        };

        let posting = Posting::new(TransactionKind::Credit, format!("Credited {}", amount));
        let mut scope = self.store.begin().await?;
        match self.apply_credit(&mut scope, id, &amount, posting).await {
            Ok(balance) => {
                scope.commit().await?;
                Ok(balance)
            }
            Err(err) => Err(scope.abort(err).await),
        }
    }

    /// Withdraw `amount` and log a `DEBIT` entry. Returns the new balance.
    ///
    /// A zero amount changes nothing and writes no entry.
    pub async fn debit(&self, id: AccountId, amount: Decimal) -> LedgerResult<Balance> {
        let Some(amount) = Amount::requested(amount)? else {
            return self.balance_of(id).await;
        };

        let posting = Posting::new(TransactionKind::Debit, format!("Debited {}", amount));
        let mut scope = self.store.begin().await?;
        match self.apply_debit(&mut scope, id, &amount, posting).await {
            Ok(balance) => {
                scope.commit().await?;
                Ok(balance)
            }
            Err(err) => {
                tracing::warn!(account_id = %id, amount = %amount, error = %err, "Debit rejected");
                Err(scope.abort(err).await)
            }
        }
    }

    /// Increment inside `scope`, then log the posting
    pub(crate) async fn apply_credit(
        &self,
        scope: &mut AtomicScope,
        id: AccountId,
        amount: &Amount,
        posting: Posting,
    ) -> LedgerResult<Balance> {
        let updated = self
            .store
            .increment_balance(scope, id, amount.minor_units(), max_minor_units())
            .await?;

        let Some(minor) = updated else {
            return Err(match self.store.scoped_balance(scope, id).await? {
                Some(_) => DomainError::InvalidAmount(format!(
                    "crediting {} would exceed the maximum balance",
                    amount
                ))
                .into(),
                None => LedgerError::account_not_found(id),
            });
        };

        self.audit.append(scope, posting.entry(id, *amount)).await?;

        let balance = Balance::from_minor_units(minor)?;
        tracing::debug!(account_id = %id, amount = %amount, balance = %balance, "Account credited");
        Ok(balance)
    }

    /// Conditionally decrement inside `scope`, then log the posting
    pub(crate) async fn apply_debit(
        &self,
        scope: &mut AtomicScope,
        id: AccountId,
        amount: &Amount,
        posting: Posting,
    ) -> LedgerResult<Balance> {
        let updated = self
            .store
            .decrement_balance(scope, id, amount.minor_units())
            .await?;

        let Some(minor) = updated else {
            return Err(match self.store.scoped_balance(scope, id).await? {
                Some(available) => DomainError::insufficient_funds(
                    amount.value(),
                    Balance::from_minor_units(available)?.value(),
                )
                .into(),
                None => LedgerError::account_not_found(id),
            });
        };

        self.audit.append(scope, posting.entry(id, *amount)).await?;

        let balance = Balance::from_minor_units(minor)?;
        tracing::debug!(account_id = %id, amount = %amount, balance = %balance, "Account debited");
        Ok(balance)
    }
}
