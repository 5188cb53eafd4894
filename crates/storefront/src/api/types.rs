//! Wire types for the products/orders API.

use mini_vendas_core::{OrderId, Price, ProductId};
use serde::{Deserialize, Deserializer, Serialize};

/// A catalog product as served by `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub price: Price,
}

impl Product {
    /// Create a product.
    #[must_use]
    pub fn new(id: i32, name: &str, description: &str, price: Price) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            price,
        }
    }
}

/// One requested line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer: String,
    pub items: Vec<OrderItem>,
}

/// A line of a created order, priced by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// Successful response of `POST /orders`.
///
/// `total` is computed by the server and is the figure shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub total: Price,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceiptLine>,
}

/// Error body returned by the API on failures, e.g. `{"detail": "out of stock"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
