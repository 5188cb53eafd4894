//! Mini Vendas Storefront library.
//!
//! Client-side core of the Mini Vendas shop: it loads the product catalog,
//! keeps a persisted cart and submits orders to the backing API. Rendering is
//! left to the front end (see the `mini-vendas-cli` crate).
//!
//! # Modules
//!
//! - [`api`] - HTTP client for `GET /products` and `POST /orders`
//! - [`catalog`] - Catalog loading with a built-in fallback, search and sort
//! - [`cart`] - Cart store: quantities, totals, persistence
//! - [`checkout`] - Order submission state machine
//! - [`storage`] - Durable key-value slots backing the cart
//! - [`state`] - Per-session application state tying it all together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
