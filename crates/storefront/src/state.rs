//! Application state for one storefront session.

use crate::api::{ApiError, HttpStorefrontApi, OrderReceipt, StorefrontApi};
use crate::cart::CartStore;
use crate::catalog::{self, Catalog};
use crate::checkout::{Checkout, CheckoutState};
use crate::config::StorefrontConfig;
use crate::error::CheckoutError;
use crate::storage::{FileStore, KeyValueStore};

/// Everything a storefront front end works with: the API client, the
/// persisted cart, the last loaded catalog and the checkout flow.
///
/// Owned by a single task; mutations go through `&mut self`.
#[derive(Debug)]
pub struct AppState<A = HttpStorefrontApi, S = FileStore> {
    config: StorefrontConfig,
    api: A,
    cart: CartStore<S>,
    catalog: Option<Catalog>,
    checkout: Checkout,
}

impl AppState {
    /// Build the production state: HTTP client plus file-backed cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = HttpStorefrontApi::new(&config)?;
        let storage = FileStore::new(config.cart_dir.clone());
        Ok(Self::new(config, api, storage))
    }
}

impl<A: StorefrontApi, S: KeyValueStore> AppState<A, S> {
    /// Create a new application state, restoring the cart from `storage`.
    pub fn new(config: StorefrontConfig, api: A, storage: S) -> Self {
        Self {
            config,
            api,
            cart: CartStore::open(storage),
            catalog: None,
            checkout: Checkout::new(),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    /// The catalog from the last [`Self::load_catalog`], if any.
    #[must_use]
    pub const fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    #[must_use]
    pub const fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    /// Fetch the catalog (or the fallback) and keep it for later reads.
    pub async fn load_catalog(&mut self) -> &Catalog {
        let catalog = catalog::load(&self.api).await;
        self.catalog.insert(catalog)
    }

    /// Submit the cart as an order for `customer`.
    ///
    /// Loads the catalog first if it has not been loaded yet.
    ///
    /// # Errors
    ///
    /// See [`Checkout::submit`].
    pub async fn checkout(&mut self, customer: &str) -> Result<OrderReceipt, CheckoutError> {
        let catalog = match self.catalog.take() {
            Some(catalog) => catalog,
            None => catalog::load(&self.api).await,
        };
        let catalog = self.catalog.insert(catalog);

        self.checkout
            .submit(customer, &mut self.cart, catalog, &self.api)
            .await
    }
}
