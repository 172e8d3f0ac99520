//! Core types for the CRM.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod pin_code;

pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use pin_code::{PinCode, PinCodeError};
