//! Database operations for the CRM `SQLite` store.
//!
//! ## Tables
//!
//! - `customers` - people, unique by phone number
//! - `addresses` - postal addresses owned by a customer (`ON DELETE CASCADE`)
//!
//! At most one address per customer is flagged as default. The flag is only
//! ever moved inside a transaction that clears the siblings before setting the
//! target, and a partial unique index rejects any second default outright.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and embedded into the
//! binary. They run at server startup (unless `CRM_RUN_MIGRATIONS=false`) or
//! on demand:
//! ```bash
//! cargo run -p crm-cli -- migrate
//! ```

pub mod addresses;
pub mod customers;
pub mod queries;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

pub use addresses::AddressRepository;
pub use customers::CustomerRepository;
pub use queries::CustomerQueries;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A transaction could not be started, committed or rolled back.
    #[error("transaction failure: {0}")]
    Transaction(#[source] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Constraint violation (e.g., duplicate phone number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool.
///
/// Every connection enforces foreign keys, uses WAL journaling and waits on a
/// busy database instead of failing immediately. The database file is created
/// when missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is malformed or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply all pending embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the recorded history does not
/// match the embedded files.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

// =============================================================================
// Transaction helpers
// =============================================================================

/// Start a transaction, mapping failure to [`RepositoryError::Transaction`].
pub(crate) async fn begin(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, RepositoryError> {
    pool.begin().await.map_err(RepositoryError::Transaction)
}

/// Commit a transaction, mapping failure to [`RepositoryError::Transaction`].
pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> Result<(), RepositoryError> {
    tx.commit().await.map_err(RepositoryError::Transaction)
}

/// Roll back after a failed step and hand back the step's error.
///
/// A rollback failure is logged; the original error is what the caller sees.
pub(crate) async fn rollback<T>(
    tx: Transaction<'static, Sqlite>,
    error: RepositoryError,
) -> Result<T, RepositoryError> {
    if let Err(e) = tx.rollback().await {
        tracing::error!(error = %e, cause = %error, "Rollback failed");
    }
    Err(error)
}

/// Map a write error, turning unique violations into [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(error: sqlx::Error, message: &str) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(message.to_owned())
        }
        _ => RepositoryError::Database(error),
    }
}

/// Whether a database error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Convert a row count reported by `SQLite` into `u64`.
pub(crate) fn count_to_u64(count: i64) -> Result<u64, RepositoryError> {
    u64::try_from(count)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative row count: {count}")))
}
