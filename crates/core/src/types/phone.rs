//! Customer phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The number of digits is outside the accepted range.
    #[error("phone number must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
    /// A character other than an ASCII digit (or a single leading `+`).
    #[error("phone number may only contain digits and an optional leading +")]
    InvalidCharacter,
}

/// A phone number: an optional leading `+` followed by 10 to 15 ASCII digits.
///
/// No separators, spaces or extensions are accepted. The value is stored
/// exactly as given, so `+919876543210` and `919876543210` are distinct.
///
/// ## Examples
///
/// ```
/// use crm_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("9876543210").is_ok());
/// assert!(PhoneNumber::parse("+919876543210").is_ok());
///
/// assert!(PhoneNumber::parse("12345").is_err());        // too short
/// assert!(PhoneNumber::parse("98765-43210").is_err());  // separator
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains anything but ASCII
    /// digits after an optional leading `+`, or has a digit count outside
    /// 10..=15.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let digits = s.strip_prefix('+').unwrap_or(s);

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidCharacter);
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneNumberError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(PhoneNumber::parse("9876543210").is_ok());
        assert!(PhoneNumber::parse("+919876543210").is_ok());
        assert!(PhoneNumber::parse("123456789012345").is_ok());
        assert!(PhoneNumber::parse("+123456789012345").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PhoneNumber::parse(""), Err(PhoneNumberError::Empty));
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            PhoneNumber::parse("123456789"),
            Err(PhoneNumberError::InvalidLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse("1234567890123456"),
            Err(PhoneNumberError::InvalidLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse("+"),
            Err(PhoneNumberError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_separators_and_letters() {
        for bad in ["98765 43210", "98765-43210", "++9876543210", "98765x3210", "９８７６５４３２１０"] {
            assert_eq!(
                PhoneNumber::parse(bad),
                Err(PhoneNumberError::InvalidCharacter),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_plus_only_allowed_in_front() {
        assert_eq!(
            PhoneNumber::parse("98765+43210"),
            Err(PhoneNumberError::InvalidCharacter)
        );
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let ok: PhoneNumber = serde_json::from_str("\"9876543210\"").unwrap();
        assert_eq!(ok.as_str(), "9876543210");
        assert!(serde_json::from_str::<PhoneNumber>("\"abc\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"9876543210\"");
    }

    #[test]
    fn test_display_and_from_str() {
        let phone: PhoneNumber = "+919876543210".parse().unwrap();
        assert_eq!(phone.to_string(), "+919876543210");
        let s: &str = phone.as_ref();
        assert_eq!(s, "+919876543210");
    }
}
