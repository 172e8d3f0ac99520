//! CRM Core - Shared types library.
//!
//! This crate provides the value types shared by every CRM component:
//! - `server` - JSON API over the customer/address store
//! - `cli` - Command-line tools for migrations, seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. The optional `sqlite` feature adds `sqlx` encoding for the
//! id types so they can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, phone numbers and PIN codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
