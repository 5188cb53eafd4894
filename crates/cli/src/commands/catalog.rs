//! `mv-cli catalog` - list products.

use std::io::Write;

use mini_vendas_storefront::api::StorefrontApi;
use mini_vendas_storefront::catalog::{Catalog, CatalogQuery};
use mini_vendas_storefront::state::AppState;
use mini_vendas_storefront::storage::KeyValueStore;

use super::{CommandError, Outcome};

/// Load the catalog and print the products matching `query`.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub async fn list<A, S>(
    state: &mut AppState<A, S>,
    query: &CatalogQuery,
    out: &mut impl Write,
) -> Result<Outcome, CommandError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    let catalog = state.load_catalog().await;
    render(catalog, query, out)?;
    Ok(Outcome::Success)
}

/// Write the catalog listing.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn render(catalog: &Catalog, query: &CatalogQuery, out: &mut impl Write) -> std::io::Result<()> {
    if catalog.is_fallback() {
        writeln!(out, "(API indisponível: exibindo produtos de exemplo)")?;
    }

    let products = catalog.query(query);
    if products.is_empty() {
        writeln!(out, "Nenhum produto encontrado")?;
        return Ok(());
    }

    for product in products {
        writeln!(out, "#{:<4} {:<24} {:>12}", product.id.as_i32(), product.name, product.price.to_string())?;
        if !product.description.is_empty() {
            writeln!(out, "      {}", product.description)?;
        }
    }
    Ok(())
}
