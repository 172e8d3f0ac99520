//! Customer domain models.

use serde::Serialize;

use crm_core::{CustomerId, PhoneNumber};

use super::address::Address;

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: PhoneNumber,
}

/// A customer annotated with how many addresses they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    pub address_count: u64,
}

/// A customer together with all of their addresses, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerWithAddresses {
    #[serde(flatten)]
    pub customer: Customer,
    pub addresses: Vec<Address>,
}

/// Validated fields for a new customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: PhoneNumber,
}

/// Validated partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<PhoneNumber>,
}
