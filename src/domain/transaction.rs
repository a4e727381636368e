//! Transaction records
//!
//! One immutable audit entry per balance change per account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{AccountId, Amount};

/// Kind of balance change recorded in the transaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Credit,
    Debit,
    TransferDebit,
    TransferCredit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "CREDIT",
            TransactionKind::Debit => "DEBIT",
            TransactionKind::TransferDebit => "TRANSFER_DEBIT",
            TransactionKind::TransferCredit => "TRANSFER_CREDIT",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction kind: {0}")]
pub struct UnknownTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionKind::Credit),
            "DEBIT" => Ok(TransactionKind::Debit),
            "TRANSFER_DEBIT" => Ok(TransactionKind::TransferDebit),
            "TRANSFER_CREDIT" => Ok(TransactionKind::TransferCredit),
            other => Err(UnknownTransactionKind(other.to_string())),
        }
    }
}

/// A stored transaction log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// Shared by both legs of a transfer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<Uuid>,
    pub previous_hash: String,
    pub record_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str_matches_parse() {
        for kind in [
            TransactionKind::Credit,
            TransactionKind::Debit,
            TransactionKind::TransferDebit,
            TransactionKind::TransferCredit,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>(), Ok(kind));
        }
        assert!("WITHDRAW".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_kind_serializes_like_the_log_column() {
        let json = serde_json::to_string(&TransactionKind::TransferDebit).unwrap();
        assert_eq!(json, "\"TRANSFER_DEBIT\"");
    }
}
