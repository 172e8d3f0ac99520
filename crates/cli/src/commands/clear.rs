//! Bulk delete commands.

use crm_server::db::{AddressRepository, CustomerRepository};

/// Delete every address.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the delete fails.
pub async fn addresses() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let deleted = AddressRepository::new(&pool).clear_all().await?;
    tracing::info!(deleted, "Addresses deleted");
    pool.close().await;
    Ok(())
}

/// Delete every customer. Addresses follow through the cascade.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the delete fails.
pub async fn customers() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let deleted = CustomerRepository::new(&pool).clear_all().await?;
    tracing::info!(deleted, "Customers (and their addresses) deleted");
    pool.close().await;
    Ok(())
}
