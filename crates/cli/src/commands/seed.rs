//! Seed the database from a YAML file.
//!
//! ```yaml
//! customers:
//!   - first_name: Asha
//!     last_name: Rao
//!     phone_number: "9876543210"
//!     addresses:
//!       - address_details: "12 MG Road"
//!         city: Pune
//!         state: Maharashtra
//!         pin_code: "411001"
//!         is_default: true
//! ```
//!
//! Each record goes through the same validation as the API. Invalid or
//! conflicting records are skipped with a warning rather than aborting the run.

use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crm_server::db::{AddressRepository, CustomerRepository, RepositoryError};
use crm_server::models::{CreateAddressRequest, CreateCustomerRequest};

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub customers: Vec<SeedCustomer>,
}

/// One customer with nested addresses.
#[derive(Debug, Deserialize)]
pub struct SeedCustomer {
    #[serde(flatten)]
    pub customer: CreateCustomerRequest,
    #[serde(default)]
    pub addresses: Vec<CreateAddressRequest>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub customers_inserted: usize,
    pub customers_skipped: usize,
    pub addresses_inserted: usize,
    pub addresses_skipped: usize,
}

/// Seed from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// fails outside of per-record validation and conflicts.
pub async fn run(file_path: &str, keep_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Parse before touching the database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(customers = seed.customers.len(), "Parsed seed file");

    let pool = super::connect().await?;
    crm_server::db::run_migrations(&pool).await?;

    let report = seed_database(&pool, seed, keep_existing).await?;

    info!("Seeding complete!");
    info!("  Customers inserted: {}", report.customers_inserted);
    info!("  Customers skipped: {}", report.customers_skipped);
    info!("  Addresses inserted: {}", report.addresses_inserted);
    info!("  Addresses skipped: {}", report.addresses_skipped);

    pool.close().await;
    Ok(())
}

/// Insert every record of `seed`, clearing existing data first unless
/// `keep_existing` is set.
///
/// # Errors
///
/// Returns `RepositoryError` for database failures other than a duplicate
/// phone number.
pub async fn seed_database(
    pool: &SqlitePool,
    seed: SeedFile,
    keep_existing: bool,
) -> Result<SeedReport, RepositoryError> {
    let customers = CustomerRepository::new(pool);
    let addresses = AddressRepository::new(pool);
    let mut report = SeedReport::default();

    if !keep_existing {
        let removed = addresses.clear_all().await?;
        let removed_customers = customers.clear_all().await?;
        info!(addresses = removed, customers = removed_customers, "Cleared existing data");
    }

    for record in seed.customers {
        let new_customer = match record.customer.validate() {
            Ok(customer) => customer,
            Err(errors) => {
                warn!(%errors, "Skipping invalid customer");
                report.customers_skipped += 1;
                report.addresses_skipped += record.addresses.len();
                continue;
            }
        };

        let customer = match customers.create(&new_customer).await {
            Ok(customer) => customer,
            Err(RepositoryError::Conflict(reason)) => {
                warn!(phone = %new_customer.phone_number, %reason, "Skipping customer");
                report.customers_skipped += 1;
                report.addresses_skipped += record.addresses.len();
                continue;
            }
            Err(e) => return Err(e),
        };
        report.customers_inserted += 1;

        for address in record.addresses {
            match address.validate() {
                Ok((new_address, make_default)) => {
                    addresses
                        .create(customer.id, &new_address, make_default)
                        .await?;
                    report.addresses_inserted += 1;
                }
                Err(errors) => {
                    warn!(customer_id = %customer.id, %errors, "Skipping invalid address");
                    report.addresses_skipped += 1;
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use crm_server::db::CustomerQueries;

    use super::*;

    const SAMPLE: &str = include_str!("../../seed/customers.yaml");

    async fn test_pool(dir: &tempfile::TempDir) -> SqlitePool {
        let url = format!("sqlite://{}", dir.path().join("seed.db").display());
        let pool = crm_server::db::create_pool(&SecretString::from(url), 2)
            .await
            .unwrap();
        crm_server::db::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_seed_sample_file() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;

        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        let report = seed_database(&pool, seed, false).await.unwrap();
        assert_eq!(report.customers_inserted, 5);
        assert_eq!(report.addresses_inserted, 7);
        assert_eq!(report.customers_skipped, 0);

        let stats = CustomerQueries::new(&pool).stats().await.unwrap();
        assert_eq!(stats.customers, 5);
        assert_eq!(stats.default_addresses, 3);
        assert_eq!(stats.single_address_customers, 2);
        assert_eq!(stats.multiple_address_customers, 2);
    }

    #[tokio::test]
    async fn test_seed_skips_invalid_and_duplicate_records() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;

        let yaml = r#"
customers:
  - first_name: Asha
    last_name: Rao
    phone_number: "9876543210"
    addresses:
      - address_details: "12 MG Road"
        city: Pune
        state: Maharashtra
        pin_code: "4110"
  - first_name: Duplicate
    last_name: Phone
    phone_number: "9876543210"
    addresses:
      - address_details: "1 Lane"
        city: Pune
        state: Maharashtra
        pin_code: "411001"
  - first_name: ""
    last_name: Blank
    phone_number: "9000000000"
"#;
        let seed: SeedFile = serde_yaml::from_str(yaml).unwrap();
        let report = seed_database(&pool, seed, false).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                customers_inserted: 1,
                customers_skipped: 2,
                addresses_inserted: 0,
                addresses_skipped: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_seed_keep_existing() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;

        let first: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        seed_database(&pool, first, false).await.unwrap();

        let again: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        let report = seed_database(&pool, again, true).await.unwrap();
        assert_eq!(report.customers_inserted, 0);
        assert_eq!(report.customers_skipped, 5);

        let again: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        let report = seed_database(&pool, again, false).await.unwrap();
        assert_eq!(report.customers_inserted, 5);
    }
}
