//! `mv-cli cart` - inspect and change the persisted cart.

use std::io::Write;

use mini_vendas_core::ProductId;
use mini_vendas_storefront::api::StorefrontApi;
use mini_vendas_storefront::cart::CartStore;
use mini_vendas_storefront::catalog::Catalog;
use mini_vendas_storefront::state::AppState;
use mini_vendas_storefront::storage::KeyValueStore;

use super::{CommandError, Outcome};

/// A change to apply to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    Add(ProductId),
    /// Quantity as typed by the user; parsed leniently.
    Set(ProductId, String),
    Remove(ProductId),
    Clear,
}

/// Print the cart resolved against the current catalog, loading it if needed.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn show<A, S>(state: &mut AppState<A, S>, out: &mut impl Write) -> Result<Outcome, CommandError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    if state.catalog().is_none() {
        state.load_catalog().await;
    }
    if let Some(catalog) = state.catalog() {
        render(state.cart(), catalog, out)?;
    }
    Ok(Outcome::Success)
}

/// Apply `change` and print the resulting cart.
///
/// `Add` and `Set` only accept products of the current catalog; an unknown id
/// leaves the cart untouched and yields [`Outcome::Failed`].
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn apply<A, S>(
    state: &mut AppState<A, S>,
    change: CartChange,
    out: &mut impl Write,
) -> Result<Outcome, CommandError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    if let CartChange::Add(id) | CartChange::Set(id, _) = &change {
        let catalog = state.load_catalog().await;
        if !catalog.contains(*id) {
            tracing::debug!(product_id = %id, "Refusing cart change for unknown product");
            writeln!(out, "Erro: produto {id} não encontrado no catálogo")?;
            return Ok(Outcome::Failed);
        }
    }

    let cart = state.cart_mut();
    match change {
        CartChange::Add(id) => cart.add(id),
        CartChange::Set(id, raw) => cart.set_from_input(id, &raw),
        CartChange::Remove(id) => cart.remove(id),
        CartChange::Clear => cart.clear(),
    }

    show(state, out).await
}

/// Write the cart summary.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn render<S: KeyValueStore>(
    cart: &CartStore<S>,
    catalog: &Catalog,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let lines = cart.line_items(catalog);
    if lines.is_empty() {
        writeln!(out, "Carrinho vazio")?;
    } else {
        for line in &lines {
            let label = format!("{} x {}", line.product.name, line.quantity);
            writeln!(out, "{label:<32} {:>12}", line.subtotal.to_string())?;
        }
        writeln!(out, "{:<32} {:>12}", "Total", cart.total_for(catalog).to_string())?;
    }

    let stale = cart.stale_ids(catalog).len();
    if stale > 0 {
        writeln!(out, "({stale} item(ns) fora do catálogo ignorado(s))")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mini_vendas_core::Price;
    use mini_vendas_storefront::api::{ApiError, OrderReceipt, OrderRequest, Product};
    use mini_vendas_storefront::config::StorefrontConfig;
    use mini_vendas_storefront::storage::MemoryStore;

    use super::*;

    /// Serves a one-product catalog and refuses orders.
    struct OneProductApi;

    impl StorefrontApi for OneProductApi {
        async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
            Ok(vec![Product::new(1, "Camiseta", "", Price::from_cents(1000))])
        }

        async fn create_order(&self, _order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
            Err(ApiError::Decode("not used".to_string()))
        }
    }

    fn state() -> AppState<OneProductApi, MemoryStore> {
        let config = StorefrontConfig::for_api("http://localhost:8000").unwrap();
        AppState::new(config, OneProductApi, MemoryStore::new())
    }

    async fn applied(
        state: &mut AppState<OneProductApi, MemoryStore>,
        change: CartChange,
    ) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = apply(state, change, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_refused() {
        let mut state = state();

        let (outcome, text) = applied(&mut state, CartChange::Add(ProductId::new(999))).await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(text, "Erro: produto 999 não encontrado no catálogo\n");
        assert_eq!(state.cart().entries().count(), 0);
        assert_eq!(state.cart().storage().get("mini-vendas.cart").unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_unknown_product_is_refused() {
        let mut state = state();

        let (outcome, _) =
            applied(&mut state, CartChange::Set(ProductId::new(7), "3".to_string())).await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(state.cart().get(ProductId::new(7)), 0);
    }

    #[tokio::test]
    async fn test_add_known_product() {
        let mut state = state();

        let (outcome, text) = applied(&mut state, CartChange::Add(ProductId::new(1))).await;

        assert_eq!(outcome, Outcome::Success);
        assert!(text.contains("Camiseta x 1"));
        assert_eq!(state.cart().get(ProductId::new(1)), 1);
    }

    #[tokio::test]
    async fn test_remove_stale_entry_is_unconditional() {
        let mut state = state();
        state.cart_mut().set(ProductId::new(999), 2);

        let (outcome, _) = applied(&mut state, CartChange::Remove(ProductId::new(999))).await;

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(state.cart().entries().count(), 0);
    }

    fn rendered(cart: &CartStore<MemoryStore>) -> String {
        let mut out = Vec::new();
        render(cart, &Catalog::fallback(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartStore::open(MemoryStore::new());
        assert_eq!(rendered(&cart), "Carrinho vazio\n");
    }

    #[test]
    fn test_lines_and_total() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.set(ProductId::new(1), 2);
        cart.add(ProductId::new(3));

        let text = rendered(&cart);
        assert!(text.contains("Camiseta x 2"));
        assert!(text.contains("R$ 79,80"));
        assert!(text.contains("Caneca x 1"));
        assert!(text.contains("R$ 98,80"));
    }

    #[test]
    fn test_stale_entries_are_reported() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.set(ProductId::new(77), 1);

        let text = rendered(&cart);
        assert!(text.starts_with("Carrinho vazio"));
        assert!(text.contains("(1 item(ns) fora do catálogo"));
    }
}
