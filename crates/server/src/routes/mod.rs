//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Readiness (database reachable)
//!
//! # Customers
//! POST   /api/customers                       - Create customer
//! GET    /api/customers                       - Filtered, sorted, paginated list
//! GET    /api/customers/single-address        - Customers with exactly one address
//! GET    /api/customers/multiple-addresses    - Customers with more than one address
//! DELETE /api/customers/clear                 - Delete every customer
//! GET    /api/customers/{id}                  - Get customer
//! PUT    /api/customers/{id}                  - Partial update
//! DELETE /api/customers/{id}                  - Delete customer and addresses
//! GET    /api/customers/{id}/details          - Customer with addresses
//! GET    /api/customers/{id}/addresses        - Addresses of a customer
//! POST   /api/customers/{id}/addresses        - Add address
//!
//! # Addresses
//! GET    /api/addresses/{id}                  - Get address
//! PUT    /api/addresses/{id}                  - Partial update, tri-state is_default
//! DELETE /api/addresses/{id}                  - Delete address
//! POST   /api/addresses/{id}/set-default      - Make default
//! DELETE /api/addresses/clear                 - Delete every address
//! ```

pub mod addresses;
pub mod customers;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the complete router (without middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(customers::router())
        .merge(addresses::router())
}
