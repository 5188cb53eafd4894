//! Catalog loading, lookup, search and sort.
//!
//! The catalog is fetched in one request. When the API cannot be reached or
//! answers with anything but a decodable product list, a built-in sample
//! catalog is shown instead: an empty storefront is worse than stale data.

use std::cmp::Ordering;
use std::str::FromStr;

use mini_vendas_core::{Price, ProductId};
use tracing::instrument;

use crate::api::{Product, StorefrontApi};

/// Where the products of a [`Catalog`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Served by the backing API.
    Remote,
    /// Built-in sample products, used because the API was unavailable.
    Fallback,
}

/// The current, read-only list of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    source: CatalogSource,
}

impl Catalog {
    /// Create a catalog from products served by the API.
    ///
    /// Negative prices are clamped to zero so totals can never go below zero.
    #[must_use]
    pub fn remote(products: Vec<Product>) -> Self {
        let products = products
            .into_iter()
            .map(|p| Product {
                price: p.price.non_negative(),
                ..p
            })
            .collect();

        Self {
            products,
            source: CatalogSource::Remote,
        }
    }

    /// The built-in sample catalog.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            products: vec![
                Product::new(1, "Camiseta", "Camiseta 100% algodão", Price::from_cents(3990)),
                Product::new(2, "Boné", "Boné com logo", Price::from_cents(2950)),
                Product::new(3, "Caneca", "Caneca cerâmica 300ml", Price::from_cents(1900)),
            ],
            source: CatalogSource::Fallback,
        }
    }

    /// Products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn source(&self) -> CatalogSource {
        self.source
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == CatalogSource::Fallback
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    /// Filter and order products for display.
    ///
    /// Search is a case-insensitive substring match on name or description.
    /// Sorting is stable, so equal keys keep catalog order.
    #[must_use]
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Product> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| {
                needle.as_ref().is_none_or(|n| {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .collect();

        match query.sort {
            SortOrder::Default => {}
            SortOrder::NameAsc => matches.sort_by(|a, b| compare_names(&a.name, &b.name)),
            SortOrder::PriceAsc => matches.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => matches.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        matches
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Display ordering for [`Catalog::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Catalog order as served.
    #[default]
    Default,
    NameAsc,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" => Ok(Self::Default),
            "name" | "name-asc" => Ok(Self::NameAsc),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Search text and ordering for the catalog view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub sort: SortOrder,
}

/// Load the catalog, substituting the fallback catalog on any failure.
#[instrument(skip(api))]
pub async fn load<A: StorefrontApi>(api: &A) -> Catalog {
    match api.fetch_products().await {
        Ok(products) => {
            tracing::info!(count = products.len(), "Catalog loaded");
            Catalog::remote(products)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load catalog, using fallback products");
            Catalog::fallback()
        }
    }
}
