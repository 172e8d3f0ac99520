//! Customer repository.

use sqlx::SqlitePool;

use crm_core::{CustomerId, PhoneNumber};

use super::{AddressRepository, RepositoryError, map_unique_violation};
use crate::models::{Customer, CustomerChanges, CustomerWithAddresses, NewCustomer};

const DUPLICATE_PHONE: &str = "phone number already exists";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    pub(crate) id: i64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) phone_number: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let phone_number = PhoneNumber::parse(&row.phone_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone number in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone number is taken.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers (first_name, last_name, phone_number)
            VALUES (?, ?, ?)
            RETURNING id, first_name, last_name, phone_number
            ",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.phone_number.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PHONE))?;

        row.try_into()
    }

    /// Apply a partial update. Fields left as `None` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this id.
    /// Returns `RepositoryError::Conflict` if the new phone number is taken.
    pub async fn update(
        &self,
        id: CustomerId,
        changes: &CustomerChanges,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customers
            SET first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                phone_number = COALESCE(?, phone_number)
            WHERE id = ?
            RETURNING id, first_name, last_name, phone_number
            ",
        )
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.phone_number.as_ref().map(PhoneNumber::as_str))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PHONE))?;

        row.ok_or(RepositoryError::NotFound("customer"))?.try_into()
    }

    /// Delete a customer. Their addresses go with them through the foreign key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this id.
    pub async fn delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("customer"));
        }

        Ok(())
    }

    /// Get a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this id.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, first_name, last_name, phone_number FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound("customer"))?.try_into()
    }

    /// Get a customer and all of their addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this id.
    pub async fn get_with_addresses(
        &self,
        id: CustomerId,
    ) -> Result<CustomerWithAddresses, RepositoryError> {
        let customer = self.get_by_id(id).await?;
        let addresses = AddressRepository::new(self.pool)
            .list_for_customer(id)
            .await?;

        Ok(CustomerWithAddresses {
            customer,
            addresses,
        })
    }

    /// Delete every customer (and, by cascade, every address).
    ///
    /// Returns the number of customers removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
