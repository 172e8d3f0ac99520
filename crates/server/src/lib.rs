//! CRM server library.
//!
//! A JSON API over customers and their addresses, backed by `SQLite`.
//! The binary in `main.rs` wires configuration, telemetry and the router;
//! everything else lives here so it can be tested in-process and reused by
//! `crm-cli`.
//!
//! # Invariant
//!
//! A customer has at most one default address. See [`db::addresses`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;

pub use app::build_router;
