//! Store statistics.

use tracing::info;

use crm_server::db::CustomerQueries;

/// Log totals and the single/multiple address partitions.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let stats = CustomerQueries::new(&pool).stats().await?;

    info!("CRM Statistics");
    info!("==============");
    info!("Customers: {}", stats.customers);
    info!("Addresses: {}", stats.addresses);
    info!("Default addresses: {}", stats.default_addresses);
    info!("Customers with one address: {}", stats.single_address_customers);
    info!("Customers with several addresses: {}", stats.multiple_address_customers);

    pool.close().await;
    Ok(())
}
