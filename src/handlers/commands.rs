//! Command definitions
//!
//! Commands represent intentions to change the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AccountId, Balance};

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move funds between two accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCommand {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
    /// Optional memo appended to both log descriptions
    pub memo: Option<String>,
}

impl TransferCommand {
    pub fn new(from_account_id: AccountId, to_account_id: AccountId, amount: Decimal) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Result of a successful transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Correlation id shared by both log entries; `None` when nothing moved
    pub transfer_id: Option<Uuid>,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Decimal,
    pub from_balance: Balance,
    pub to_balance: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_command() {
        let from = AccountId::new(1_000_000_001);
        let to = AccountId::new(1_000_000_002);
        let cmd = TransferCommand::new(from, to, dec!(100.00)).with_memo("Rent");

        assert_eq!(cmd.from_account_id, from);
        assert_eq!(cmd.to_account_id, to);
        assert_eq!(cmd.amount, dec!(100.00));
        assert_eq!(cmd.memo.as_deref(), Some("Rent"));
    }
}
