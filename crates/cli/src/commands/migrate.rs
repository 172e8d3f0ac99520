//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded into both
//! binaries, so `crm-cli migrate` and server startup apply the same set.

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    crm_server::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    pool.close().await;
    Ok(())
}
