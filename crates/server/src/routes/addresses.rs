//! Address API handlers.

use axum::{
    Router,
    extract::State,
    routing::{delete, get, post},
};
use tracing::instrument;

use crm_core::AddressId;

use super::customers::Deleted;
use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    models::{Address, UpdateAddressRequest},
    response::ApiResponse,
    state::AppState,
};

/// Build the addresses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/addresses/clear", delete(clear))
        .route(
            "/api/addresses/{id}",
            get(show).put(update).delete(destroy),
        )
        .route("/api/addresses/{id}/set-default", post(set_default))
}

/// Get an address.
///
/// # Errors
///
/// 404 if the address does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<ApiResponse<Address>, AppError> {
    let address = state.addresses().get(id).await?;
    Ok(ApiResponse::ok("success", address))
}

/// Partially update an address. `is_default` is tri-state: `true` makes it
/// the only default, `false` clears it, absent or `null` leaves flags alone.
///
/// # Errors
///
/// Validation failures (400) or an unknown address (404).
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AddressId>,
    ApiJson(body): ApiJson<UpdateAddressRequest>,
) -> Result<ApiResponse<Address>, AppError> {
    let (changes, requested_default) = body.validate()?;
    let address = state
        .addresses()
        .update(id, &changes, requested_default)
        .await?;
    Ok(ApiResponse::ok("Address updated", address))
}

/// Delete an address. The customer is left without a default if this was it.
///
/// # Errors
///
/// 404 if the address does not exist.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<ApiResponse<()>, AppError> {
    state.addresses().delete(id).await?;
    Ok(ApiResponse::message("Address deleted"))
}

/// Make an address its customer's only default.
///
/// # Errors
///
/// 404 if the address does not exist.
#[instrument(skip(state))]
pub async fn set_default(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<ApiResponse<Address>, AppError> {
    let address = state.addresses().set_default(id).await?;
    Ok(ApiResponse::ok("Default address updated", address))
}

/// Delete every address.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<ApiResponse<Deleted>, AppError> {
    let deleted = state.addresses().clear_all().await?;
    tracing::warn!(deleted, "All addresses deleted");
    Ok(ApiResponse::ok("All addresses deleted", Deleted { deleted }))
}
