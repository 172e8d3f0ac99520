//! Address repository.
//!
//! Every change to the default flag happens inside one transaction whose
//! first statement clears the other defaults of the same customer. Starting
//! with a write takes `SQLite`'s writer lock up front, so concurrent
//! assignments queue behind each other and each one commits a state with
//! exactly one default.

use chrono::NaiveDateTime;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crm_core::{AddressId, CustomerId, PinCode};

use super::{RepositoryError, begin, commit, is_foreign_key_violation, rollback};
use crate::models::{Address, AddressChanges, NewAddress};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i64,
    customer_id: i64,
    address_details: String,
    city: String,
    state: String,
    pin_code: String,
    is_default: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let pin_code = PinCode::parse(&row.pin_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid pin code in database: {e}"))
        })?;

        Ok(Self {
            id: AddressId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            address_details: row.address_details,
            city: row.city,
            state: row.state,
            pin_code,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add an address to a customer.
    ///
    /// With `make_default`, the customer's other defaults are cleared and the
    /// new row is inserted as default in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Transaction` if the transaction cannot be
    /// started or committed.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        address: &NewAddress,
        make_default: bool,
    ) -> Result<Address, RepositoryError> {
        let mut tx = begin(self.pool).await?;

        let row = match insert_address(&mut tx, customer_id, address, make_default).await {
            Ok(row) => row,
            Err(e) => return rollback(tx, e).await,
        };

        commit(tx).await?;
        tracing::debug!(address_id = row.id, customer_id = %customer_id, make_default, "Address created");
        row.try_into()
    }

    /// Apply a partial update and an optional default-flag change atomically.
    ///
    /// `Some(true)` makes this the customer's only default, `Some(false)`
    /// clears this row's flag alone, `None` leaves every flag as it is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    /// Returns `RepositoryError::Transaction` if the transaction cannot be
    /// started or committed.
    pub async fn update(
        &self,
        id: AddressId,
        changes: &AddressChanges,
        requested_default: Option<bool>,
    ) -> Result<Address, RepositoryError> {
        let mut tx = begin(self.pool).await?;

        let row = match apply_update(&mut tx, id, changes, requested_default).await {
            Ok(Some(row)) => row,
            Ok(None) => return rollback(tx, RepositoryError::NotFound("address")).await,
            Err(e) => return rollback(tx, e).await,
        };

        commit(tx).await?;
        row.try_into()
    }

    /// Make an address its customer's only default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    pub async fn set_default(&self, id: AddressId) -> Result<Address, RepositoryError> {
        let address = self.update(id, &AddressChanges::default(), Some(true)).await?;
        tracing::info!(address_id = %id, customer_id = %address.customer_id, "Default address assigned");
        Ok(address)
    }

    /// Delete an address. No other address is promoted to default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    pub async fn delete(&self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("address"));
        }

        Ok(())
    }

    /// Get one address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    pub async fn get(&self, id: AddressId) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, customer_id, address_details, city, state, pin_code,
                   is_default, created_at, updated_at
            FROM addresses
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound("address"))?.try_into()
    }

    /// All addresses of a customer in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, customer_id, address_details, city, state, pin_code,
                   is_default, created_at, updated_at
            FROM addresses
            WHERE customer_id = ?
            ORDER BY id ASC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete every address. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Transaction steps
// =============================================================================

async fn insert_address(
    tx: &mut Transaction<'static, Sqlite>,
    customer_id: CustomerId,
    address: &NewAddress,
    make_default: bool,
) -> Result<AddressRow, RepositoryError> {
    if make_default {
        sqlx::query(
            r"
            UPDATE addresses
            SET is_default = 0, updated_at = CURRENT_TIMESTAMP
            WHERE customer_id = ? AND is_default = 1
            ",
        )
        .bind(customer_id)
        .execute(&mut **tx)
        .await?;
    }

    sqlx::query_as::<_, AddressRow>(
        r"
        INSERT INTO addresses (customer_id, address_details, city, state, pin_code, is_default)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, customer_id, address_details, city, state, pin_code,
                  is_default, created_at, updated_at
        ",
    )
    .bind(customer_id)
    .bind(&address.address_details)
    .bind(&address.city)
    .bind(&address.state)
    .bind(address.pin_code.as_str())
    .bind(make_default)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            RepositoryError::NotFound("customer")
        } else {
            RepositoryError::Database(e)
        }
    })
}

async fn apply_update(
    tx: &mut Transaction<'static, Sqlite>,
    id: AddressId,
    changes: &AddressChanges,
    requested_default: Option<bool>,
) -> Result<Option<AddressRow>, RepositoryError> {
    if requested_default == Some(true) {
        clear_sibling_defaults(tx, id).await?;
    }

    let row = sqlx::query_as::<_, AddressRow>(
        r"
        UPDATE addresses
        SET address_details = COALESCE(?, address_details),
            city = COALESCE(?, city),
            state = COALESCE(?, state),
            pin_code = COALESCE(?, pin_code),
            is_default = COALESCE(?, is_default),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        RETURNING id, customer_id, address_details, city, state, pin_code,
                  is_default, created_at, updated_at
        ",
    )
    .bind(changes.address_details.as_deref())
    .bind(changes.city.as_deref())
    .bind(changes.state.as_deref())
    .bind(changes.pin_code.as_ref().map(PinCode::as_str))
    .bind(requested_default)
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row)
}

/// Clear the default flag on every other address of the same customer.
async fn clear_sibling_defaults(
    tx: &mut Transaction<'static, Sqlite>,
    id: AddressId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE addresses
        SET is_default = 0, updated_at = CURRENT_TIMESTAMP
        WHERE customer_id = (SELECT customer_id FROM addresses WHERE id = ?)
          AND id <> ?
          AND is_default = 1
        ",
    )
    .bind(id)
    .bind(id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
