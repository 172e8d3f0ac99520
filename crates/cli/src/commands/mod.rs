//! Subcommand implementations.

pub mod clear;
pub mod migrate;
pub mod seed;
pub mod stats;

use crm_server::config::CrmConfig;
use sqlx::SqlitePool;

/// Open the configured database.
pub(crate) async fn connect() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let config = CrmConfig::from_env()?;
    let pool =
        crm_server::db::create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Connected to database");
    Ok(pool)
}
