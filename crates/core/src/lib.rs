//! Room Service Core - Shared domain types.
//!
//! This crate provides the types used across all room-service components:
//! - `server` - Guest ordering API and staff dashboard API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere,
//! including by a client that holds the guest's cart.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money helpers, statuses, catalog and order records,
//!   and the client cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
