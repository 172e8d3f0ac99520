//! Customer API handlers.

use axum::{
    Router,
    extract::State,
    routing::{delete, get},
};
use serde::Serialize;
use tracing::instrument;

use crm_core::CustomerId;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        Address, CreateAddressRequest, CreateCustomerRequest, Customer, CustomerSummary,
        CustomerWithAddresses, ListCustomersQuery, UpdateCustomerRequest,
    },
    response::{ApiResponse, PageResponse},
    state::AppState,
};

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/single-address", get(single_address))
        .route("/api/customers/multiple-addresses", get(multiple_addresses))
        .route("/api/customers/clear", delete(clear))
        .route(
            "/api/customers/{id}",
            get(show).put(update).delete(destroy),
        )
        .route("/api/customers/{id}/details", get(details))
        .route(
            "/api/customers/{id}/addresses",
            get(list_addresses).post(create_address),
        )
}

/// Number of rows removed by a bulk delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// Create a customer.
///
/// # Errors
///
/// Validation failures (400) or a duplicate phone number (409).
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCustomerRequest>,
) -> Result<ApiResponse<Customer>, AppError> {
    let new_customer = body.validate()?;
    let customer = state.customers().create(&new_customer).await?;
    tracing::info!(customer_id = %customer.id, "Customer created");
    Ok(ApiResponse::created("Customer created", customer))
}

/// List customers with filters, sorting and pagination.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListCustomersQuery>,
) -> Result<PageResponse<CustomerSummary>, AppError> {
    let (filters, sort, pagination) = query.into_parts();
    let page = state
        .queries()
        .list_customers(&filters, sort, pagination)
        .await?;
    Ok(page.into())
}

/// Customers that own exactly one address.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn single_address(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CustomerSummary>>, AppError> {
    let customers = state.queries().list_by_single_address().await?;
    Ok(ApiResponse::ok("success", customers))
}

/// Customers that own more than one address.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn multiple_addresses(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CustomerSummary>>, AppError> {
    let customers = state.queries().list_by_multiple_addresses().await?;
    Ok(ApiResponse::ok("success", customers))
}

/// Delete every customer and, through the cascade, every address.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<ApiResponse<Deleted>, AppError> {
    let deleted = state.customers().clear_all().await?;
    tracing::warn!(deleted, "All customers deleted");
    Ok(ApiResponse::ok("All customers deleted", Deleted { deleted }))
}

/// Get a customer.
///
/// # Errors
///
/// 404 if the customer does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<ApiResponse<Customer>, AppError> {
    let customer = state.customers().get_by_id(id).await?;
    Ok(ApiResponse::ok("success", customer))
}

/// Partially update a customer.
///
/// # Errors
///
/// Validation failures (400), unknown customer (404), or a duplicate phone
/// number (409).
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(body): ApiJson<UpdateCustomerRequest>,
) -> Result<ApiResponse<Customer>, AppError> {
    let changes = body.validate()?;
    let customer = state.customers().update(id, &changes).await?;
    Ok(ApiResponse::ok("Customer updated", customer))
}

/// Delete a customer together with their addresses.
///
/// # Errors
///
/// 404 if the customer does not exist.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<ApiResponse<()>, AppError> {
    state.customers().delete(id).await?;
    tracing::info!(customer_id = %id, "Customer deleted");
    Ok(ApiResponse::message("Customer deleted"))
}

/// Get a customer with all of their addresses.
///
/// # Errors
///
/// 404 if the customer does not exist.
#[instrument(skip(state))]
pub async fn details(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<ApiResponse<CustomerWithAddresses>, AppError> {
    let customer = state.customers().get_with_addresses(id).await?;
    Ok(ApiResponse::ok("success", customer))
}

/// List a customer's addresses, oldest first.
///
/// # Errors
///
/// 404 if the customer does not exist.
#[instrument(skip(state))]
pub async fn list_addresses(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<ApiResponse<Vec<Address>>, AppError> {
    state.customers().get_by_id(id).await?;
    let addresses = state.addresses().list_for_customer(id).await?;
    Ok(ApiResponse::ok("success", addresses))
}

/// Add an address to a customer, optionally as their default.
///
/// # Errors
///
/// Validation failures (400) or an unknown customer (404).
#[instrument(skip(state, body))]
pub async fn create_address(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(body): ApiJson<CreateAddressRequest>,
) -> Result<ApiResponse<Address>, AppError> {
    let (new_address, make_default) = body.validate()?;
    let address = state
        .addresses()
        .create(id, &new_address, make_default)
        .await?;

    let message = if address.is_default {
        "Address added and set as default"
    } else {
        "Address added"
    };
    Ok(ApiResponse::created(message, address))
}
