//! Client-side cart: product id to quantity, persisted on every change.
//!
//! The cart stores only ids and quantities. Prices, names and availability
//! always come from the [`Catalog`] passed in at read time, so an entry for a
//! product that has since left the catalog is kept but contributes nothing.
//!
//! A quantity of zero is never stored: setting an entry to zero removes it.
//!
//! # Persistence
//!
//! The whole mapping is written to the [`KeyValueStore`] slot
//! [`CART_STORAGE_KEY`] after every mutation, as a JSON object such as
//! `{"1": 2, "3": 1}`. A missing or unreadable slot loads as an empty cart.

use std::collections::BTreeMap;

use mini_vendas_core::{Price, ProductId};

use crate::api::{OrderItem, Product};
use crate::catalog::Catalog;
use crate::storage::{KeyValueStore, StorageError};

/// Storage slot holding the persisted cart.
pub const CART_STORAGE_KEY: &str = "mini-vendas.cart";

/// A cart entry resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem<'a> {
    pub product: &'a Product,
    pub quantity: u32,
    pub subtotal: Price,
}

impl LineItem<'_> {
    /// The `{product_id, quantity}` pair sent when ordering.
    #[must_use]
    pub const fn order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.product.id,
            quantity: self.quantity,
        }
    }
}

/// The cart and its durable slot.
#[derive(Debug)]
pub struct CartStore<S> {
    items: BTreeMap<ProductId, u32>,
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Restore the cart from `storage`.
    ///
    /// Never fails: an absent slot, a read error or a corrupted value all
    /// yield an empty cart.
    pub fn open(storage: S) -> Self {
        let items = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => decode_cart(&raw).unwrap_or_else(|| {
                tracing::warn!("Stored cart is corrupted, starting with an empty cart");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored cart, starting with an empty cart");
                BTreeMap::new()
            }
        };

        tracing::debug!(entries = items.len(), "Cart restored");
        Self { items, storage }
    }

    /// Quantity stored for `id`, or 0.
    #[must_use]
    pub fn get(&self, id: ProductId) -> u32 {
        self.items.get(&id).copied().unwrap_or(0)
    }

    /// Set the quantity for `id`.
    ///
    /// Negative values become 0 and values above `u32::MAX` saturate.
    /// Zero removes the entry.
    pub fn set(&mut self, id: ProductId, quantity: i64) {
        let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        if quantity == 0 {
            self.items.remove(&id);
        } else {
            self.items.insert(id, quantity);
        }
        self.persist();
    }

    /// Set the quantity from raw user input.
    ///
    /// Reads a leading integer the way a quantity field does (`"3"`, `" 3 "`,
    /// `"3abc"` are all 3); anything else counts as 0.
    pub fn set_from_input(&mut self, id: ProductId, raw: &str) {
        self.set(id, parse_quantity(raw));
    }

    /// Add `step` to the quantity of `id`, leaving it at 1 or more.
    pub fn increment(&mut self, id: ProductId, step: i64) {
        let next = i64::from(self.get(id)).saturating_add(step).max(1);
        self.set(id, next);
    }

    /// Add one unit of `id`.
    pub fn add(&mut self, id: ProductId) {
        self.increment(id, 1);
    }

    /// Delete the entry for `id`.
    pub fn remove(&mut self, id: ProductId) {
        self.items.remove(&id);
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Raw stored entries, including ids the catalog no longer has.
    pub fn entries(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }

    /// Entries whose product is not in `catalog`.
    #[must_use]
    pub fn stale_ids(&self, catalog: &Catalog) -> Vec<ProductId> {
        self.items
            .keys()
            .filter(|id| !catalog.contains(**id))
            .copied()
            .collect()
    }

    /// Entries resolved against `catalog`, in catalog order.
    #[must_use]
    pub fn line_items<'a>(&self, catalog: &'a Catalog) -> Vec<LineItem<'a>> {
        catalog
            .products()
            .iter()
            .filter_map(|product| {
                let quantity = self.get(product.id);
                (quantity > 0).then(|| LineItem {
                    product,
                    quantity,
                    subtotal: product.price * quantity,
                })
            })
            .collect()
    }

    /// Sum of `price * quantity` over the products in `catalog`.
    #[must_use]
    pub fn total_for(&self, catalog: &Catalog) -> Price {
        self.line_items(catalog).iter().map(|line| line.subtotal).sum()
    }

    /// Number of units across the line items of `catalog`.
    #[must_use]
    pub fn item_count(&self, catalog: &Catalog) -> u32 {
        self.line_items(catalog)
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Whether nothing in the cart can be ordered from `catalog`.
    #[must_use]
    pub fn is_empty_for(&self, catalog: &Catalog) -> bool {
        self.line_items(catalog).is_empty()
    }

    /// Write the whole cart to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded or written.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&self.items)?;
        self.storage.set(CART_STORAGE_KEY, &encoded)
    }

    /// Borrow the underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Decode a stored cart.
///
/// Returns `None` when the value is not a JSON object. Inside an object,
/// entries with a non-integer key or a value that is not a positive integer
/// are dropped. Integral floats such as `2.0` count as integers.
#[must_use]
pub fn decode_cart(raw: &str) -> Option<BTreeMap<ProductId, u32>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    let items = object
        .iter()
        .filter_map(|(key, qty)| {
            let id = key.parse::<ProductId>().ok()?;
            let qty = decode_quantity(qty)?;
            (qty > 0).then_some((id, qty))
        })
        .collect();

    Some(items)
}

#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn decode_quantity(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = value.as_f64()?;
    (n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n)).then_some(n as u32)
}

/// Leading-integer parse of a quantity field; unparseable input is 0.
fn parse_quantity(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, s.get(1..).unwrap_or("")),
        Some(b'+') => (false, s.get(1..).unwrap_or("")),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let Some(number) = digits.get(..end).filter(|d| !d.is_empty()) else {
        return 0;
    };

    let magnitude = number.parse::<i64>().unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}
