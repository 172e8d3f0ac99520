//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::CrmConfig;
use crate::db::{AddressRepository, CustomerQueries, CustomerRepository};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no mutable state; every request works
/// against the database directly.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CrmConfig,
    pool: SqlitePool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: CrmConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &CrmConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    #[must_use]
    pub fn customers(&self) -> CustomerRepository<'_> {
        CustomerRepository::new(self.pool())
    }

    #[must_use]
    pub fn addresses(&self) -> AddressRepository<'_> {
        AddressRepository::new(self.pool())
    }

    #[must_use]
    pub fn queries(&self) -> CustomerQueries<'_> {
        CustomerQueries::new(self.pool())
    }
}
