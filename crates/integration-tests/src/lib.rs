//! Integration test harness for the CRM service.
//!
//! Each [`TestApp`] owns a fresh `SQLite` file in a temporary directory with
//! all migrations applied, plus the full router (middleware included) wired
//! to it. Requests are driven in-process through `tower::ServiceExt::oneshot`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p crm-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use crm_core::CustomerId;
use crm_server::config::CrmConfig;
use crm_server::db::{self, AddressRepository, CustomerQueries, CustomerRepository};
use crm_server::models::{Address, Customer, NewAddress, NewCustomer};
use crm_server::state::AppState;

/// A migrated database plus a router bound to it.
pub struct TestApp {
    pub pool: SqlitePool,
    pub router: Router,
    _dir: TempDir,
}

impl TestApp {
    /// Create an app over a brand-new database.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("crm-test.db").display());

        let config = CrmConfig::from_lookup(|key| match key {
            "CRM_DATABASE_URL" => Some(url.clone()),
            "CRM_DB_MAX_CONNECTIONS" => Some("8".to_owned()),
            _ => None,
        })
        .unwrap();

        let pool = db::create_pool(&config.database_url, config.db_max_connections)
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();

        let router = crm_server::build_router(AppState::new(config, pool.clone()));

        Self {
            pool,
            router,
            _dir: dir,
        }
    }

    pub fn customers(&self) -> CustomerRepository<'_> {
        CustomerRepository::new(&self.pool)
    }

    pub fn addresses(&self) -> AddressRepository<'_> {
        AddressRepository::new(&self.pool)
    }

    pub fn queries(&self) -> CustomerQueries<'_> {
        CustomerQueries::new(&self.pool)
    }

    /// Insert a customer directly through the store.
    pub async fn create_customer(&self, first_name: &str, last_name: &str, phone: &str) -> Customer {
        self.customers()
            .create(&new_customer(first_name, last_name, phone))
            .await
            .unwrap()
    }

    /// Insert an address directly through the store.
    pub async fn create_address(&self, customer_id: CustomerId, city: &str, make_default: bool) -> Address {
        self.addresses()
            .create(customer_id, &new_address(city), make_default)
            .await
            .unwrap()
    }

    /// Number of default addresses a customer currently has.
    pub async fn default_count(&self, customer_id: CustomerId) -> usize {
        self.addresses()
            .list_for_customer(customer_id)
            .await
            .unwrap()
            .iter()
            .filter(|a| a.is_default)
            .count()
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty or
    /// not JSON).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.request_raw(method, uri, body).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Send a request and return the raw body bytes.
    pub async fn request_raw(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

/// Validated customer fields for store-level tests.
pub fn new_customer(first_name: &str, last_name: &str, phone: &str) -> NewCustomer {
    NewCustomer {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        phone_number: phone.parse().unwrap(),
    }
}

/// Validated address fields in `city`.
pub fn new_address(city: &str) -> NewAddress {
    NewAddress {
        address_details: format!("1 Main Street, {city}"),
        city: city.to_owned(),
        state: "Maharashtra".to_owned(),
        pin_code: "411001".parse().unwrap(),
    }
}

/// A distinct valid phone number for index `n`.
#[must_use]
pub fn phone(n: u32) -> String {
    format!("98{n:08}")
}
