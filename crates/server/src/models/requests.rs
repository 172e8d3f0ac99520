//! Request bodies and their validation.
//!
//! Every string is trimmed before it is checked or stored. Create requests
//! require all fields; update requests only check the fields that are present.

use serde::{Deserialize, Deserializer};

use crm_core::{PhoneNumber, PinCode};

use super::address::{AddressChanges, NewAddress};
use super::customer::{CustomerChanges, NewCustomer};
use super::validation::{ValidationErrors, non_blank};

const PIN_CODE_MESSAGE: &str = "pin_code must be exactly 6 digits";

// =============================================================================
// Customers
// =============================================================================

/// Body of `POST /api/customers`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl CreateCustomerRequest {
    /// Validate and normalise into a [`NewCustomer`].
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(self) -> Result<NewCustomer, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = non_blank(self.first_name);
        if first_name.is_none() {
            errors.add("first_name", "First name required");
        }

        let last_name = non_blank(self.last_name);
        if last_name.is_none() {
            errors.add("last_name", "Last name required");
        }

        let phone_number = parse_phone(self.phone_number.as_deref().unwrap_or(""));
        if phone_number.is_none() {
            errors.add("phone_number", "Invalid phone number");
        }

        match (first_name, last_name, phone_number) {
            (Some(first_name), Some(last_name), Some(phone_number)) if errors.is_empty() => {
                Ok(NewCustomer {
                    first_name,
                    last_name,
                    phone_number,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Body of `PUT /api/customers/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl UpdateCustomerRequest {
    /// Validate the provided fields into [`CustomerChanges`].
    ///
    /// # Errors
    ///
    /// Returns every provided field that fails its rule.
    pub fn validate(self) -> Result<CustomerChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut changes = CustomerChanges::default();

        if let Some(first_name) = self.first_name {
            changes.first_name = non_blank(Some(first_name));
            if changes.first_name.is_none() {
                errors.add("first_name", "First name required");
            }
        }

        if let Some(last_name) = self.last_name {
            changes.last_name = non_blank(Some(last_name));
            if changes.last_name.is_none() {
                errors.add("last_name", "Last name required");
            }
        }

        if let Some(phone_number) = self.phone_number {
            changes.phone_number = parse_phone(&phone_number);
            if changes.phone_number.is_none() {
                errors.add("phone_number", "Invalid phone number");
            }
        }

        errors.into_result(|| changes)
    }
}

// =============================================================================
// Addresses
// =============================================================================

/// Body of `POST /api/customers/{id}/addresses`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAddressRequest {
    #[serde(default)]
    pub address_details: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pin_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_default: Option<bool>,
}

impl CreateAddressRequest {
    /// Validate into a [`NewAddress`] plus the requested default flag
    /// (`false` when not mentioned).
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(self) -> Result<(NewAddress, bool), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let address_details = non_blank(self.address_details);
        if address_details.is_none() {
            errors.add("address_details", "address_details is required");
        }

        let city = non_blank(self.city);
        if city.is_none() {
            errors.add("city", "city is required");
        }

        let state = non_blank(self.state);
        if state.is_none() {
            errors.add("state", "state is required");
        }

        let pin_code = PinCode::parse(self.pin_code.as_deref().unwrap_or("").trim()).ok();
        if pin_code.is_none() {
            errors.add("pin_code", PIN_CODE_MESSAGE);
        }

        match (address_details, city, state, pin_code) {
            (Some(address_details), Some(city), Some(state), Some(pin_code))
                if errors.is_empty() =>
            {
                let address = NewAddress {
                    address_details,
                    city,
                    state,
                    pin_code,
                };
                Ok((address, self.is_default.unwrap_or(false)))
            }
            _ => Err(errors),
        }
    }
}

/// Body of `PUT /api/addresses/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAddressRequest {
    #[serde(default)]
    pub address_details: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pin_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_default: Option<bool>,
}

impl UpdateAddressRequest {
    /// Validate the provided fields. The returned flag is tri-state:
    /// `Some(true)` makes this the default, `Some(false)` clears it, `None`
    /// leaves it alone.
    ///
    /// # Errors
    ///
    /// Returns every provided field that fails its rule.
    pub fn validate(self) -> Result<(AddressChanges, Option<bool>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut changes = AddressChanges::default();

        if let Some(value) = self.address_details {
            changes.address_details = non_blank(Some(value));
            if changes.address_details.is_none() {
                errors.add("address_details", "address_details cannot be empty");
            }
        }

        if let Some(value) = self.city {
            changes.city = non_blank(Some(value));
            if changes.city.is_none() {
                errors.add("city", "city cannot be empty");
            }
        }

        if let Some(value) = self.state {
            changes.state = non_blank(Some(value));
            if changes.state.is_none() {
                errors.add("state", "state cannot be empty");
            }
        }

        if let Some(value) = self.pin_code {
            changes.pin_code = PinCode::parse(value.trim()).ok();
            if changes.pin_code.is_none() {
                errors.add("pin_code", PIN_CODE_MESSAGE);
            }
        }

        let is_default = self.is_default;
        errors.into_result(|| (changes, is_default))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_phone(raw: &str) -> Option<PhoneNumber> {
    PhoneNumber::parse(raw.trim()).ok()
}

/// Loosely typed default flag as clients send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Flag {
    fn truthy(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(n) => n != 0,
            Self::Float(n) => n != 0.0,
            Self::Text(s) => !matches!(s.trim(), "" | "0" | "false"),
        }
    }
}

/// Accept booleans, numbers (`0` is false) and strings (`""`, `"0"`,
/// `"false"` are false). `null` means the flag was not mentioned.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flag>::deserialize(deserializer)?.map(Flag::truthy))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn messages(errors: &ValidationErrors) -> Vec<&str> {
        errors.errors().iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_create_customer_trims_fields() {
        let request: CreateCustomerRequest = serde_json::from_value(json!({
            "first_name": "  Asha ",
            "last_name": "Rao",
            "phone_number": " 9876543210 "
        }))
        .unwrap();

        let customer = request.validate().unwrap();
        assert_eq!(customer.first_name, "Asha");
        assert_eq!(customer.phone_number.as_str(), "9876543210");
    }

    #[test]
    fn test_create_customer_reports_every_field() {
        let request: CreateCustomerRequest = serde_json::from_value(json!({
            "first_name": "   ",
            "phone_number": "12-34"
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "First name required",
                "Last name required",
                "Invalid phone number"
            ]
        );
    }

    #[test]
    fn test_update_customer_only_checks_present_fields() {
        let request: UpdateCustomerRequest =
            serde_json::from_value(json!({ "last_name": "Iyer" })).unwrap();
        let changes = request.validate().unwrap();
        assert_eq!(changes.last_name.as_deref(), Some("Iyer"));
        assert!(changes.first_name.is_none());
        assert!(changes.phone_number.is_none());

        let request: UpdateCustomerRequest =
            serde_json::from_value(json!({ "phone_number": "abc" })).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(messages(&errors), vec!["Invalid phone number"]);
    }

    #[test]
    fn test_create_address_messages() {
        let request: CreateAddressRequest =
            serde_json::from_value(json!({ "pin_code": "4110" })).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "address_details is required",
                "city is required",
                "state is required",
                "pin_code must be exactly 6 digits"
            ]
        );
    }

    #[test]
    fn test_create_address_default_flag_defaults_to_false() {
        let request: CreateAddressRequest = serde_json::from_value(json!({
            "address_details": "12 MG Road",
            "city": "Pune",
            "state": "MH",
            "pin_code": "411001"
        }))
        .unwrap();
        let (address, is_default) = request.validate().unwrap();
        assert_eq!(address.city, "Pune");
        assert!(!is_default);
    }

    #[test]
    fn test_update_address_empty_field_message() {
        let request: UpdateAddressRequest =
            serde_json::from_value(json!({ "city": "  ", "pin_code": "abcdef" })).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(
            messages(&errors),
            vec!["city cannot be empty", "pin_code must be exactly 6 digits"]
        );
    }

    #[test]
    fn test_is_default_coercion() {
        let cases = [
            (json!(true), Some(true)),
            (json!(false), Some(false)),
            (json!(1), Some(true)),
            (json!(0), Some(false)),
            (json!(2.5), Some(true)),
            (json!("true"), Some(true)),
            (json!("yes"), Some(true)),
            (json!("false"), Some(false)),
            (json!("0"), Some(false)),
            (json!(""), Some(false)),
            (json!(null), None),
        ];

        for (value, expected) in cases {
            let request: UpdateAddressRequest =
                serde_json::from_value(json!({ "is_default": value.clone() })).unwrap();
            assert_eq!(request.is_default, expected, "{value}");
        }

        let request: UpdateAddressRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.is_default, None);
    }
}
