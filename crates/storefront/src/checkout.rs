//! Order submission as an explicit state machine.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Success | Failed
//!            |                            |
//!            +--> Idle (validation error) +--> Idle (reset / next submit)
//! ```
//!
//! The cart is cleared only after the server confirms the order. Any failure
//! leaves it exactly as it was so the visitor can try again.

use tracing::instrument;

use crate::api::{OrderReceipt, OrderRequest, StorefrontApi};
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::error::{CheckoutError, ValidationError};
use crate::storage::KeyValueStore;

/// Where the checkout flow currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success(OrderReceipt),
    Failed(CheckoutError),
}

/// Drives one order submission at a time.
///
/// `submit` takes `&mut self`, so a second submission cannot start while one
/// is in flight.
#[derive(Debug, Default)]
pub struct Checkout {
    state: CheckoutState,
}

impl Checkout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Return to `Idle`, discarding the last outcome.
    pub fn reset(&mut self) {
        self.state = CheckoutState::Idle;
    }

    /// Validate and submit an order for everything in `cart` that `catalog`
    /// still offers.
    ///
    /// On success the cart is cleared and the server's receipt is returned;
    /// its `total` is the amount to display.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::Validation` if `customer` is blank or there is
    ///   nothing to order. No request is made.
    /// - `CheckoutError::Server`, `Transport` or `Decode` if the request
    ///   fails. The cart is left untouched.
    #[instrument(
        skip(self, customer, cart, catalog, api),
        fields(customer_len = customer.trim().chars().count())
    )]
    pub async fn submit<S, A>(
        &mut self,
        customer: &str,
        cart: &mut CartStore<S>,
        catalog: &Catalog,
        api: &A,
    ) -> Result<OrderReceipt, CheckoutError>
    where
        S: KeyValueStore,
        A: StorefrontApi,
    {
        self.state = CheckoutState::Validating;
        let order = match build_order(customer, cart, catalog) {
            Ok(order) => order,
            Err(e) => {
                tracing::debug!(error = %e, "Checkout blocked by validation");
                self.state = CheckoutState::Idle;
                return Err(e.into());
            }
        };

        self.state = CheckoutState::Submitting;
        match api.create_order(&order).await {
            Ok(receipt) => {
                cart.clear();
                tracing::info!(
                    order_id = %receipt.id,
                    total = %receipt.total,
                    items = order.items.len(),
                    "Order created"
                );
                self.state = CheckoutState::Success(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                let err = CheckoutError::from(e);
                tracing::warn!(error = %err, "Order submission failed");
                self.state = CheckoutState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

/// Build the order body, or explain why there is nothing to submit.
///
/// # Errors
///
/// Returns `ValidationError::MissingCustomer` for a blank name and
/// `ValidationError::EmptyCart` when no cart entry matches the catalog.
pub fn build_order<S: KeyValueStore>(
    customer: &str,
    cart: &CartStore<S>,
    catalog: &Catalog,
) -> Result<OrderRequest, ValidationError> {
    let customer = customer.trim();
    if customer.is_empty() {
        return Err(ValidationError::MissingCustomer);
    }

    let items: Vec<_> = cart
        .line_items(catalog)
        .iter()
        .map(crate::cart::LineItem::order_item)
        .collect();
    if items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    Ok(OrderRequest {
        customer: customer.to_string(),
        items,
    })
}
