//! Read-side customer queries: filtered listing and address-count partitions.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::customers::CustomerRow;
use super::{RepositoryError, count_to_u64};
use crate::models::{Customer, CustomerFilters, CustomerSort, CustomerSummary, Page, Pagination};

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    address_count: i64,
}

impl TryFrom<SummaryRow> for CustomerSummary {
    type Error = RepositoryError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            customer: Customer::try_from(row.customer)?,
            address_count: count_to_u64(row.address_count)?,
        })
    }
}

/// Store-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrmStats {
    pub customers: u64,
    pub addresses: u64,
    pub default_addresses: u64,
    pub single_address_customers: u64,
    pub multiple_address_customers: u64,
}

/// Which side of the address-count partition to list.
#[derive(Debug, Clone, Copy)]
enum Partition {
    Single,
    Multiple,
}

/// Query service for customer listings.
pub struct CustomerQueries<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerQueries<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// One page of customers matching `filters`, ordered by `sort`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list_customers(
        &self,
        filters: &CustomerFilters,
        sort: CustomerSort,
        pagination: Pagination,
    ) -> Result<Page<CustomerSummary>, RepositoryError> {
        let mut count_builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM customers c");
        push_filters(&mut count_builder, filters);

        let (total,): (i64,) = count_builder.build_query_as().fetch_one(self.pool).await?;
        let total = count_to_u64(total)?;

        let mut select_builder = QueryBuilder::<Sqlite>::new(
            r"
            SELECT c.id, c.first_name, c.last_name, c.phone_number,
                   (SELECT COUNT(*) FROM addresses a WHERE a.customer_id = c.id) AS address_count
            FROM customers c
            ",
        );
        push_filters(&mut select_builder, filters);

        select_builder
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(" ")
            .push(sort.order.as_sql())
            .push(", c.id ASC LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));

        let rows: Vec<SummaryRow> = select_builder
            .build_query_as()
            .fetch_all(self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, pagination, total))
    }

    /// Customers owning exactly one address, by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_single_address(&self) -> Result<Vec<CustomerSummary>, RepositoryError> {
        self.list_partition(Partition::Single).await
    }

    /// Customers owning more than one address, by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_multiple_addresses(
        &self,
    ) -> Result<Vec<CustomerSummary>, RepositoryError> {
        self.list_partition(Partition::Multiple).await
    }

    async fn list_partition(
        &self,
        partition: Partition,
    ) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let having = match partition {
            Partition::Single => "HAVING COUNT(a.id) = 1",
            Partition::Multiple => "HAVING COUNT(a.id) > 1",
        };

        let mut builder = QueryBuilder::<Sqlite>::new(
            r"
            SELECT c.id, c.first_name, c.last_name, c.phone_number,
                   COUNT(a.id) AS address_count
            FROM customers c
            JOIN addresses a ON a.customer_id = c.id
            GROUP BY c.id
            ",
        );
        builder.push(having).push(" ORDER BY c.id ASC");

        let rows: Vec<SummaryRow> = builder.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Totals across the whole store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<CrmStats, RepositoryError> {
        let (customers, addresses, default_addresses, single, multiple): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r"
                WITH counts AS (
                    SELECT customer_id, COUNT(*) AS n FROM addresses GROUP BY customer_id
                )
                SELECT
                    (SELECT COUNT(*) FROM customers),
                    (SELECT COUNT(*) FROM addresses),
                    (SELECT COUNT(*) FROM addresses WHERE is_default = 1),
                    (SELECT COUNT(*) FROM counts WHERE n = 1),
                    (SELECT COUNT(*) FROM counts WHERE n > 1)
                ",
            )
            .fetch_one(self.pool)
            .await?;

        Ok(CrmStats {
            customers: count_to_u64(customers)?,
            addresses: count_to_u64(addresses)?,
            default_addresses: count_to_u64(default_addresses)?,
            single_address_customers: count_to_u64(single)?,
            multiple_address_customers: count_to_u64(multiple)?,
        })
    }
}

/// Escape `LIKE` wildcards so user input matches literally (`ESCAPE '\'`).
fn like_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Append the `WHERE` clause for `filters`. `SQLite`'s `LIKE` is
/// case-insensitive for ASCII.
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &CustomerFilters) {
    let mut has_where = false;
    let mut next_clause = |builder: &mut QueryBuilder<'_, Sqlite>| {
        builder.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
    };

    if let Some(search) = &filters.search {
        let pattern = like_pattern(search);
        next_clause(builder);
        builder
            .push("(c.first_name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR c.last_name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR c.phone_number LIKE ")
            .push_bind(pattern.clone())
            .push(
                " ESCAPE '\\' OR EXISTS (SELECT 1 FROM addresses a \
                 WHERE a.customer_id = c.id AND a.address_details LIKE ",
            )
            .push_bind(pattern)
            .push(" ESCAPE '\\'))");
    }

    for (column, value) in [
        ("city", &filters.city),
        ("state", &filters.state),
        ("pin_code", &filters.pin_code),
    ] {
        if let Some(value) = value {
            next_clause(builder);
            builder
                .push("EXISTS (SELECT 1 FROM addresses a WHERE a.customer_id = c.id AND a.")
                .push(column)
                .push(" LIKE ")
                .push_bind(like_pattern(value))
                .push(" ESCAPE '\\')");
        }
    }
}
