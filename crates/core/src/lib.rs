//! Mini Vendas Core - Shared types library.
//!
//! This crate provides common types used across all Mini Vendas components:
//! - `storefront` - Catalog loading, cart state and checkout
//! - `cli` - Command-line front end driving the storefront core
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
