//! Domain models and request types.

pub mod address;
pub mod customer;
pub mod listing;
pub mod requests;
pub mod validation;

pub use address::{Address, AddressChanges, NewAddress};
pub use customer::{Customer, CustomerChanges, CustomerSummary, CustomerWithAddresses, NewCustomer};
pub use listing::{
    CustomerFilters, CustomerSort, ListCustomersQuery, Page, Pagination, SortField, SortOrder,
};
pub use requests::{
    CreateAddressRequest, CreateCustomerRequest, UpdateAddressRequest, UpdateCustomerRequest,
};
pub use validation::{FieldError, ValidationErrors};
