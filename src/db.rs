//! Database module
//!
//! Connection pool setup, migrations and schema checks.

use std::str::FromStr;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;

/// Embedded schema migrations (see `migrations/`)
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Tables the ledger cannot run without
const REQUIRED_TABLES: [&str; 2] = ["accounts", "transactions"];

/// Open a connection pool for the configured database.
///
/// In-memory databases live only as long as their connection, so they get
/// a single connection that is never recycled.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = is_in_memory(&config.database_url);

    let mut options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.database_busy_timeout);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = SqlitePoolOptions::new().acquire_timeout(config.database_acquire_timeout);
    let pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(config.database_max_connections)
    };

    pool_options.connect_with(options).await
}

/// Apply pending migrations
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &SqlitePool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:ledger?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://ledger.db"));
    }

    #[tokio::test]
    async fn test_migrate_creates_schema() {
        let pool = connect(&Config::new("sqlite::memory:")).await.unwrap();
        assert!(!check_schema(&pool).await.unwrap());

        migrate(&pool).await.unwrap();
        verify_connection(&pool).await.unwrap();
        assert!(check_schema(&pool).await.unwrap());
    }
}
