//! Ledger Store
//!
//! Owns the connection pool and the account-table statements. Balance
//! mutations run inside an `AtomicScope`; plain reads go straight to the
//! pool so they always see the latest committed state.

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::domain::AccountId;
use crate::error::LedgerResult;

use super::AtomicScope;

/// Handle to the ledger database
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    /// Create a new LedgerStore with a database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and bring the schema up to date
    pub async fn open(config: &Config) -> LedgerResult<Self> {
        let pool = db::connect(config).await?;
        db::migrate(&pool).await.map_err(sqlx::Error::from)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start an atomic scope.
    ///
    /// Fails with a storage error when no connection frees up within the
    /// pool's acquire timeout.
    pub async fn begin(&self) -> LedgerResult<AtomicScope> {
        let tx = self.pool.begin().await?;
        Ok(AtomicScope::new(tx))
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // =========================================================================
    // Reads (outside any scope)
    // =========================================================================

    pub async fn account_exists(&self, id: AccountId) -> LedgerResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE account_id = ?1)")
                .bind(id.value())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Current balance in minor units, `None` if the account is missing
    pub async fn fetch_balance(&self, id: AccountId) -> LedgerResult<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM accounts WHERE account_id = ?1")
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await?;
        Ok(balance)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a zero-balance account. Returns `false` if the number is taken.
    pub async fn insert_account(&self, id: AccountId) -> LedgerResult<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO accounts (account_id, balance) VALUES (?1, 0)")
                .bind(id.value())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Add `amount` minor units unless the result would exceed `ceiling`.
    ///
    /// Returns the new balance, or `None` when no row was changed (missing
    /// account or ceiling hit).
    pub async fn increment_balance(
        &self,
        scope: &mut AtomicScope,
        id: AccountId,
        amount: i64,
        ceiling: i64,
    ) -> LedgerResult<Option<i64>> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET balance = balance + ?1
            WHERE account_id = ?2 AND balance <= ?3 - ?1
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(id.value())
        .bind(ceiling)
        .fetch_optional(scope.connection())
        .await?;
        Ok(balance)
    }

    /// Subtract `amount` minor units if the balance covers it.
    ///
    /// The funds check and the write are one statement, so nothing can slip
    /// in between them. Returns the new balance, or `None` when no row was
    /// changed (missing account or insufficient funds).
    pub async fn decrement_balance(
        &self,
        scope: &mut AtomicScope,
        id: AccountId,
        amount: i64,
    ) -> LedgerResult<Option<i64>> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET balance = balance - ?1
            WHERE account_id = ?2 AND balance >= ?1
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(id.value())
        .fetch_optional(scope.connection())
        .await?;
        Ok(balance)
    }

    /// Balance as seen from inside `scope`
    pub async fn scoped_balance(
        &self,
        scope: &mut AtomicScope,
        id: AccountId,
    ) -> LedgerResult<Option<i64>> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM accounts WHERE account_id = ?1")
                .bind(id.value())
                .fetch_optional(scope.connection())
                .await?;
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> LedgerStore {
        LedgerStore::open(&Config::new("sqlite::memory:")).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_account_rejects_duplicates() {
        let store = memory_store().await;
        let id = AccountId::new(1_111_111_111);

        assert!(store.insert_account(id).await.unwrap());
        assert!(!store.insert_account(id).await.unwrap());
        assert_eq!(store.fetch_balance(id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_decrement_refuses_overdraft() {
        let store = memory_store().await;
        let id = AccountId::new(2_222_222_222);
        store.insert_account(id).await.unwrap();

        let mut scope = store.begin().await.unwrap();
        assert_eq!(
            store.increment_balance(&mut scope, id, 500, 10_000).await.unwrap(),
            Some(500)
        );
        assert_eq!(store.decrement_balance(&mut scope, id, 501).await.unwrap(), None);
        assert_eq!(store.decrement_balance(&mut scope, id, 500).await.unwrap(), Some(0));
        scope.commit().await.unwrap();

        assert_eq!(store.fetch_balance(id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_increment_respects_ceiling() {
        let store = memory_store().await;
        let id = AccountId::new(3_333_333_333);
        store.insert_account(id).await.unwrap();

        let mut scope = store.begin().await.unwrap();
        assert_eq!(store.increment_balance(&mut scope, id, 101, 100).await.unwrap(), None);
        assert_eq!(store.increment_balance(&mut scope, id, 100, 100).await.unwrap(), Some(100));
        scope.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_scope_rolls_back() {
        let store = memory_store().await;
        let id = AccountId::new(4_444_444_444);
        store.insert_account(id).await.unwrap();

        {
            let mut scope = store.begin().await.unwrap();
            store.increment_balance(&mut scope, id, 700, 10_000).await.unwrap();
            assert_eq!(store.scoped_balance(&mut scope, id).await.unwrap(), Some(700));
        }

        assert_eq!(store.fetch_balance(id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_explicit_rollback() {
        let store = memory_store().await;
        let id = AccountId::new(5_555_555_555);
        store.insert_account(id).await.unwrap();

        let mut scope = store.begin().await.unwrap();
        store.increment_balance(&mut scope, id, 300, 10_000).await.unwrap();
        scope.rollback().await.unwrap();

        assert_eq!(store.fetch_balance(id).await.unwrap(), Some(0));
    }
}
