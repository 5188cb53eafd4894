//! `mv-cli checkout` - submit the cart as an order.

use std::io::Write;

use mini_vendas_storefront::api::{OrderReceipt, StorefrontApi};
use mini_vendas_storefront::error::CheckoutError;
use mini_vendas_storefront::state::AppState;
use mini_vendas_storefront::storage::KeyValueStore;

use super::{CommandError, Outcome};

/// Submit the order and report the server's answer.
///
/// # Errors
///
/// Returns an error if output cannot be written. Checkout failures are
/// reported to `out` and yield [`Outcome::Failed`].
pub async fn run<A, S>(
    state: &mut AppState<A, S>,
    customer: &str,
    out: &mut impl Write,
) -> Result<Outcome, CommandError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    let result = state.checkout(customer).await;
    render(&result, out)?;
    Ok(if result.is_ok() {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

/// Write the checkout result.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn render(
    result: &Result<OrderReceipt, CheckoutError>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    match result {
        Ok(receipt) => writeln!(
            out,
            "Pedido {} criado — total {}",
            receipt.id, receipt.total
        ),
        Err(err) => writeln!(out, "Erro: {}", err.user_message()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mini_vendas_core::{OrderId, Price};
    use mini_vendas_storefront::error::ValidationError;

    use super::*;

    fn rendered(result: &Result<OrderReceipt, CheckoutError>) -> String {
        let mut out = Vec::new();
        render(result, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_success_shows_server_total() {
        let receipt = OrderReceipt {
            id: OrderId::new(42),
            total: Price::from_cents(2500),
            customer: Some("Ana".to_string()),
            items: Vec::new(),
        };
        assert_eq!(rendered(&Ok(receipt)), "Pedido 42 criado — total R$ 25,00\n");
    }

    #[test]
    fn test_failure_shows_user_message() {
        let err = CheckoutError::Server {
            status: 503,
            message: "out of stock".to_string(),
        };
        assert_eq!(rendered(&Err(err)), "Erro: out of stock\n");

        let err = CheckoutError::from(ValidationError::EmptyCart);
        assert_eq!(rendered(&Err(err)), "Erro: Carrinho vazio\n");
    }
}
