//! `reqwest` implementation of [`StorefrontApi`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::ErrorBody;
use super::{ApiError, OrderReceipt, OrderRequest, Product, StorefrontApi};
use crate::config::StorefrontConfig;

/// How much of an unexpected body to keep in logs.
const LOG_BODY_LIMIT: usize = 500;

/// HTTP client for the products/orders API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpStorefrontApi {
    inner: Arc<HttpStorefrontApiInner>,
}

struct HttpStorefrontApiInner {
    client: reqwest::Client,
    products_url: Url,
    orders_url: Url,
}

impl std::fmt::Debug for HttpStorefrontApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStorefrontApi")
            .field("products_url", &self.inner.products_url.as_str())
            .field("orders_url", &self.inner.orders_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpStorefrontApi {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the base URL cannot
    /// be extended with the endpoint paths.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpStorefrontApiInner {
                client,
                products_url: endpoint(&config.api_url, "products")?,
                orders_url: endpoint(&config.api_url, "orders")?,
            }),
        })
    }

    /// Full URL of the products endpoint.
    #[must_use]
    pub fn products_url(&self) -> &Url {
        &self.inner.products_url
    }

    /// Full URL of the orders endpoint.
    #[must_use]
    pub fn orders_url(&self) -> &Url {
        &self.inner.orders_url
    }

    /// Turn a response into `T`, or into the matching `ApiError`.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            // Body is best-effort: a failure to read it must not mask the status.
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|b| b.detail);

            tracing::warn!(
                status = %status,
                body = %truncate(&body),
                "API returned non-success status"
            );
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        // Status was 2xx, so a body that breaks off counts as undecodable.
        let body = response.text().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read API response body");
            ApiError::Decode(e.to_string())
        })?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse API response"
            );
            ApiError::Decode(e.to_string())
        })
    }
}

impl StorefrontApi for HttpStorefrontApi {
    #[instrument(skip(self), fields(url = %self.inner.products_url))]
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.inner.products_url.clone())
            .send()
            .await?;

        let products: Vec<Product> = Self::read_json(response).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self, order), fields(url = %self.inner.orders_url, items = order.items.len()))]
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        let response = self
            .inner
            .client
            .post(self.inner.orders_url.clone())
            .json(order)
            .send()
            .await?;

        Self::read_json(response).await
    }
}

/// Append `path` to `base`, keeping any path prefix the base already has.
fn endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path)?)
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
