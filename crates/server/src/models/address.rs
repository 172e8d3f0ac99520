//! Address domain models.

use chrono::NaiveDateTime;
use serde::Serialize;

use crm_core::{AddressId, CustomerId, PinCode};

/// A stored address.
///
/// Timestamps are UTC as written by `SQLite`'s `CURRENT_TIMESTAMP`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub customer_id: CustomerId,
    pub address_details: String,
    pub city: String,
    pub state: String,
    pub pin_code: PinCode,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validated fields for a new address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub address_details: String,
    pub city: String,
    pub state: String,
    pub pin_code: PinCode,
}

/// Validated partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AddressChanges {
    pub address_details: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<PinCode>,
}
