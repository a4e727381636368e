//! Transfer Coordinator
//!
//! Moves funds between two accounts in one atomic scope: debit the sender,
//! credit the receiver, log both legs, commit. Any failure rolls back
//! everything, log entries included.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{AccountId, Amount, Balance, DomainError, TransactionKind};
use crate::error::LedgerResult;
use crate::store::{AtomicScope, LedgerStore};

use super::balance_handler::Posting;
use super::{AccountRegistry, BalanceOperations, TransferCommand, TransferReceipt};

/// Coordinates two-account transfers
#[derive(Debug, Clone)]
pub struct TransferCoordinator {
    store: LedgerStore,
    registry: AccountRegistry,
    balances: BalanceOperations,
}

impl TransferCoordinator {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            registry: AccountRegistry::new(store.clone()),
            balances: BalanceOperations::new(store.clone()),
            store,
        }
    }

    /// Transfer `amount` from one account to another
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> LedgerResult<TransferReceipt> {
        self.execute(TransferCommand::new(from, to, amount)).await
    }

    /// Execute the transfer command
    pub async fn execute(&self, command: TransferCommand) -> LedgerResult<TransferReceipt> {
        let amount = Amount::requested(command.amount)?;

        if command.from_account_id == command.to_account_id {
            return Err(DomainError::SameAccountTransfer.into());
        }

        let Some(amount) = amount else {
            return self.zero_transfer(&command).await;
        };

        let transfer_id = Uuid::new_v4();
        let mut scope = self.store.begin().await?;

        match self.move_funds(&mut scope, &command, &amount, transfer_id).await {
            Ok((from_balance, to_balance)) => {
                scope.commit().await?;

                tracing::info!(
                    transfer_id = %transfer_id,
                    from_account_id = %command.from_account_id,
                    to_account_id = %command.to_account_id,
                    amount = %amount,
                    "Transfer completed"
                );

                Ok(TransferReceipt {
                    transfer_id: Some(transfer_id),
                    from_account_id: command.from_account_id,
                    to_account_id: command.to_account_id,
                    amount: amount.value(),
                    from_balance,
                    to_balance,
                })
            }
            Err(err) => {
                tracing::warn!(
                    transfer_id = %transfer_id,
                    from_account_id = %command.from_account_id,
                    to_account_id = %command.to_account_id,
                    amount = %amount,
                    error = %err,
                    "Transfer rolled back"
                );
                Err(scope.abort(err).await)
            }
        }
    }

    /// Both legs of a transfer inside `scope`.
    ///
    /// The sender's conditional debit is the scope's first statement, so the
    /// funds check runs under the store's write lock.
    async fn move_funds(
        &self,
        scope: &mut AtomicScope,
        command: &TransferCommand,
        amount: &Amount,
        transfer_id: Uuid,
    ) -> LedgerResult<(Balance, Balance)> {
        let memo = command.memo.as_deref();

        let debit = Posting::new(
            TransactionKind::TransferDebit,
            describe(
                format!("Transferred {} to account {}", amount, command.to_account_id),
                memo,
            ),
        )
        .in_transfer(transfer_id);
        let from_balance = self
            .balances
            .apply_debit(scope, command.from_account_id, amount, debit)
            .await?;

        let credit = Posting::new(
            TransactionKind::TransferCredit,
            describe(
                format!("Received {} from account {}", amount, command.from_account_id),
                memo,
            ),
        )
        .in_transfer(transfer_id);
        let to_balance = self
            .balances
            .apply_credit(scope, command.to_account_id, amount, credit)
            .await?;

        Ok((from_balance, to_balance))
    }

    /// A zero transfer moves nothing but still requires both accounts
    async fn zero_transfer(&self, command: &TransferCommand) -> LedgerResult<TransferReceipt> {
        let from = self.registry.account(command.from_account_id).await?;
        let to = self.registry.account(command.to_account_id).await?;

        Ok(TransferReceipt {
            transfer_id: None,
            from_account_id: from.id,
            to_account_id: to.id,
            amount: Decimal::ZERO,
            from_balance: from.balance,
            to_balance: to.balance,
        })
    }
}

fn describe(base: String, memo: Option<&str>) -> String {
    match memo {
        Some(memo) if !memo.trim().is_empty() => format!("{} ({})", base, memo.trim()),
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_with_memo() {
        assert_eq!(describe("Sent".to_string(), None), "Sent");
        assert_eq!(describe("Sent".to_string(), Some("  ")), "Sent");
        assert_eq!(describe("Sent".to_string(), Some(" rent ")), "Sent (rent)");
    }
}
