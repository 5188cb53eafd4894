//! Client for the Mini Vendas products/orders API.
//!
//! # Endpoints
//!
//! - `GET {base}/products` - full catalog, no pagination
//! - `POST {base}/orders` - create an order, returns `{id, total}`
//!
//! The catalog loader and checkout flow are written against the
//! [`StorefrontApi`] trait so they can be driven by an in-memory fake in tests;
//! [`HttpStorefrontApi`] is the `reqwest` implementation used in production.
//!
//! # Example
//!
//! ```rust,ignore
//! use mini_vendas_storefront::api::{HttpStorefrontApi, StorefrontApi};
//!
//! let api = HttpStorefrontApi::new(&config)?;
//! let products = api.fetch_products().await?;
//! ```

mod http;
pub mod types;

use std::future::Future;

pub use http::HttpStorefrontApi;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the backing API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable response reached us (connection refused, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Server error: HTTP {status}{}", format_detail(.detail.as_deref()))]
    Server { status: u16, detail: Option<String> },

    /// A success response carried a body we could not decode.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The configured base URL cannot be extended with an endpoint path.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn format_detail(detail: Option<&str>) -> String {
    detail.map_or_else(String::new, |d| format!(" - {d}"))
}

/// Operations the storefront needs from the backing API.
pub trait StorefrontApi: Send + Sync {
    /// Fetch the full product catalog.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Submit an order.
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;
}
