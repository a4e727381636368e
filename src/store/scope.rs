//! Atomic scope
//!
//! A unit of work against the store that either commits as a whole or is
//! rolled back. Dropping a scope without calling `commit` rolls it back.

use std::fmt;

use sqlx::{Sqlite, SqliteConnection, Transaction};

use crate::error::LedgerError;

/// An open store transaction
pub struct AtomicScope {
    tx: Transaction<'static, Sqlite>,
}

impl AtomicScope {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Connection to run statements on inside this scope
    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Make every change in the scope durable
    pub async fn commit(self) -> Result<(), LedgerError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard every change in the scope
    pub async fn rollback(self) -> Result<(), LedgerError> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Roll back because `cause` happened and hand back the error to report.
    ///
    /// If the rollback fails too, both failures are returned together with
    /// `cause` kept as the primary error.
    pub async fn abort(self, cause: LedgerError) -> LedgerError {
        match self.tx.rollback().await {
            Ok(()) => cause,
            Err(rollback) => {
                tracing::error!(error = %rollback, cause = %cause, "Rollback failed");
                LedgerError::RollbackFailed {
                    original: Box::new(cause),
                    rollback,
                }
            }
        }
    }
}

impl fmt::Debug for AtomicScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicScope").finish_non_exhaustive()
    }
}
