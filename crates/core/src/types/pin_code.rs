//! Postal index number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PinCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PinCodeError {
    /// Not exactly six characters long.
    #[error("pin code must be exactly {expected} digits")]
    InvalidLength {
        /// Required digit count.
        expected: usize,
    },
    /// A character other than an ASCII digit.
    #[error("pin code may only contain digits")]
    InvalidCharacter,
}

/// A six-digit postal code.
///
/// ```
/// use crm_core::PinCode;
///
/// assert!(PinCode::parse("411001").is_ok());
/// assert!(PinCode::parse("41100").is_err());
/// assert!(PinCode::parse("4110a1").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PinCode(String);

impl PinCode {
    /// Number of digits in a pin code.
    pub const LENGTH: usize = 6;

    /// Parse a `PinCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PinCodeError> {
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinCodeError::InvalidCharacter);
        }

        if s.len() != Self::LENGTH {
            return Err(PinCodeError::InvalidLength {
                expected: Self::LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pin code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PinCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PinCode {
    type Err = PinCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PinCode {
    type Error = PinCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PinCode> for String {
    fn from(pin: PinCode) -> Self {
        pin.0
    }
}

impl AsRef<str> for PinCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
