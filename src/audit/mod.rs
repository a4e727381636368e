//! Audit Logger
//!
//! Append-only transaction log with a per-account hash chain. Entries are
//! written only inside the atomic scope of the mutation they describe, so a
//! rolled-back mutation never leaves a log entry behind.

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::{AccountId, Amount, TransactionKind, TransactionRecord};
use crate::error::{LedgerError, LedgerResult};
use crate::store::{AtomicScope, LedgerStore};

/// `previous_hash` of the first entry in every account's chain
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A log entry about to be written
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub description: String,
    pub transfer_id: Option<Uuid>,
}

impl NewEntry {
    pub fn new(account_id: AccountId, kind: TransactionKind, amount: Amount) -> Self {
        Self {
            account_id,
            kind,
            amount,
            description: String::new(),
            transfer_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn transfer_id(mut self, transfer_id: Uuid) -> Self {
        self.transfer_id = Some(transfer_id);
        self
    }
}

/// Audit Logger
#[derive(Debug, Clone)]
pub struct AuditLogger {
    store: LedgerStore,
}

impl AuditLogger {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Append
    // =========================================================================

    /// Write one entry inside the caller's scope.
    ///
    /// The timestamp is assigned by the store and never goes backwards for
    /// an account, even if the wall clock does.
    pub(crate) async fn append(
        &self,
        scope: &mut AtomicScope,
        entry: NewEntry,
    ) -> LedgerResult<TransactionRecord> {
        // Read under the scope's write lock, so nothing can interleave
        // between these values and the insert below.
        let (previous_hash, sequence, time): (Option<String>, i64, String) = sqlx::query_as(
            r#"
            SELECT
                (SELECT record_hash FROM transactions
                 WHERE account_number = ?1
                 ORDER BY transaction_id DESC
                 LIMIT 1),
                (SELECT COUNT(*) FROM transactions WHERE account_number = ?1) + 1,
                MAX(
                    strftime('%Y-%m-%d %H:%M:%f', 'now'),
                    COALESCE((SELECT MAX(transaction_time) FROM transactions WHERE account_number = ?1), '')
                )
            "#,
        )
        .bind(entry.account_id.value())
        .fetch_one(scope.connection())
        .await?;

        let previous_hash = previous_hash.unwrap_or_else(|| GENESIS_HASH.to_string());
        let timestamp = parse_log_time(&time)?;

        let record_hash = chain_hash(&ChainLink {
            sequence: sequence as u64,
            account_id: entry.account_id,
            kind: entry.kind,
            amount_minor: entry.amount.minor_units(),
            timestamp: &time,
            description: &entry.description,
            transfer_id: entry.transfer_id,
            previous_hash: &previous_hash,
        });

        let row = sqlx::query(
            r#"
            INSERT INTO transactions (
                account_number, transaction_type, amount, transaction_time,
                description, transfer_id, previous_hash, record_hash
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING transaction_id
            "#,
        )
        .bind(entry.account_id.value())
        .bind(entry.kind.as_str())
        .bind(entry.amount.minor_units())
        .bind(&time)
        .bind(&entry.description)
        .bind(entry.transfer_id)
        .bind(&previous_hash)
        .bind(&record_hash)
        .fetch_one(scope.connection())
        .await?;

        let id: i64 = row.try_get("transaction_id")?;

        tracing::debug!(
            transaction_id = id,
            account_id = %entry.account_id,
            kind = %entry.kind,
            amount = %entry.amount,
            "Transaction logged"
        );

        Ok(TransactionRecord {
            id,
            account_id: entry.account_id,
            kind: entry.kind,
            amount: entry.amount,
            timestamp,
            description: entry.description,
            transfer_id: entry.transfer_id,
            previous_hash,
            record_hash,
        })
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Transaction history of an account, newest first.
    ///
    /// Nothing is read until the returned history is streamed. Unknown
    /// accounts simply have an empty history.
    pub fn history(&self, account_id: AccountId) -> History {
        History {
            store: self.store.clone(),
            account_id,
        }
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Recompute an account's hash chain in insertion order
    pub async fn verify_chain(&self, account_id: AccountId) -> LedgerResult<ChainVerification> {
        let mut rows = sqlx::query_as::<_, RecordRow>(CHAIN_SQL)
            .bind(account_id.value())
            .fetch(self.store.pool());

        let mut expected_previous = GENESIS_HASH.to_string();
        let mut checked = 0u64;

        while let Some(row) = rows.try_next().await? {
            let stored_time = row.4.clone();
            let record = into_record(row)?;
            checked += 1;

            if record.previous_hash != expected_previous {
                return Ok(ChainVerification::broken(
                    checked,
                    record.id,
                    expected_previous,
                    record.previous_hash,
                ));
            }

            let recomputed = chain_hash(&ChainLink {
                sequence: checked,
                account_id: record.account_id,
                kind: record.kind,
                amount_minor: record.amount.minor_units(),
                timestamp: &stored_time,
                description: &record.description,
                transfer_id: record.transfer_id,
                previous_hash: &record.previous_hash,
            });
            if recomputed != record.record_hash {
                return Ok(ChainVerification::broken(
                    checked,
                    record.id,
                    recomputed,
                    record.record_hash,
                ));
            }

            expected_previous = record.record_hash;
        }

        Ok(ChainVerification {
            is_valid: true,
            entries_checked: checked,
            first_invalid_entry: None,
            expected_hash: None,
            actual_hash: None,
        })
    }
}

/// Lazy, restartable view of an account's transaction log
#[derive(Debug, Clone)]
pub struct History {
    store: LedgerStore,
    account_id: AccountId,
}

impl History {
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Stream the entries, newest first. Each call starts a fresh query.
    pub fn stream(&self) -> BoxStream<'_, LedgerResult<TransactionRecord>> {
        sqlx::query_as::<_, RecordRow>(HISTORY_SQL)
            .bind(self.account_id.value())
            .fetch(self.store.pool())
            .map(|row| row.map_err(LedgerError::from).and_then(into_record))
            .boxed()
    }

    /// Read the whole history into memory
    pub async fn collect(&self) -> LedgerResult<Vec<TransactionRecord>> {
        self.stream().try_collect().await
    }
}

const HISTORY_SQL: &str = r#"
    SELECT transaction_id, account_number, transaction_type, amount, transaction_time,
           description, transfer_id, previous_hash, record_hash
    FROM transactions
    WHERE account_number = ?1
    ORDER BY transaction_time DESC, transaction_id DESC
"#;

const CHAIN_SQL: &str = r#"
    SELECT transaction_id, account_number, transaction_type, amount, transaction_time,
           description, transfer_id, previous_hash, record_hash
    FROM transactions
    WHERE account_number = ?1
    ORDER BY transaction_id ASC
"#;

type RecordRow = (
    i64,
    i64,
    String,
    i64,
    String,
    String,
    Option<Uuid>,
    String,
    String,
);

fn into_record(row: RecordRow) -> LedgerResult<TransactionRecord> {
    let (id, account, kind, amount, time, description, transfer_id, previous_hash, record_hash) =
        row;

    let kind: TransactionKind = kind.parse().map_err(corrupt_row)?;
    let amount = Amount::from_minor_units(amount).map_err(corrupt_row)?;

    Ok(TransactionRecord {
        id,
        account_id: AccountId::new(account),
        kind,
        amount,
        timestamp: parse_log_time(&time)?,
        description,
        transfer_id,
        previous_hash,
        record_hash,
    })
}

fn corrupt_row<E>(err: E) -> LedgerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    LedgerError::Storage(sqlx::Error::Decode(Box::new(err)))
}

/// Result of hash chain verification
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChainVerification {
    pub is_valid: bool,
    pub entries_checked: u64,
    pub first_invalid_entry: Option<i64>,
    pub expected_hash: Option<String>,
    pub actual_hash: Option<String>,
}

impl ChainVerification {
    fn broken(checked: u64, entry: i64, expected: String, actual: String) -> Self {
        Self {
            is_valid: false,
            entries_checked: checked,
            first_invalid_entry: Some(entry),
            expected_hash: Some(expected),
            actual_hash: Some(actual),
        }
    }
}

/// Layout of `transaction_time` (SQLite `strftime('%Y-%m-%d %H:%M:%f')`)
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn parse_log_time(time: &str) -> LedgerResult<DateTime<Utc>> {
    let time = NaiveDateTime::parse_from_str(time, LOG_TIME_FORMAT).map_err(corrupt_row)?;
    Ok(time.and_utc())
}

/// Everything a record's hash commits to
struct ChainLink<'a> {
    /// 1-based position in the account's log
    sequence: u64,
    account_id: AccountId,
    kind: TransactionKind,
    amount_minor: i64,
    /// Stored text, hashed verbatim
    timestamp: &'a str,
    description: &'a str,
    transfer_id: Option<Uuid>,
    previous_hash: &'a str,
}

fn chain_hash(link: &ChainLink<'_>) -> String {
    let input = format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        link.sequence,
        link.account_id,
        link.kind,
        link.amount_minor,
        link.timestamp,
        link.description,
        link.transfer_id.map(|id| id.to_string()).unwrap_or_default(),
        link.previous_hash
    );
    sha256_hex(&input)
}

/// Calculate SHA-256 hash and return as hex string
fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
