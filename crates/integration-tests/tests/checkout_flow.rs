//! Integration tests for the checkout flow against a mock API.
//!
//! The catalog is served with Camiseta at 10,00 and Boné at 5,00 so the
//! expected totals are easy to read.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use mini_vendas_core::{OrderId, Price, ProductId};
use mini_vendas_integration_tests::{Canned, MockApi, truncated_body_url, unreachable_url};
use mini_vendas_storefront::api::HttpStorefrontApi;
use mini_vendas_storefront::cart::CART_STORAGE_KEY;
use mini_vendas_storefront::checkout::CheckoutState;
use mini_vendas_storefront::config::StorefrontConfig;
use mini_vendas_storefront::error::{CONNECTIVITY_FAILURE, CheckoutError, GENERIC_ORDER_FAILURE};
use mini_vendas_storefront::state::AppState;
use mini_vendas_storefront::storage::{FileStore, KeyValueStore, MemoryStore};
use serde_json::{Value, json};

fn priced_products() -> Value {
    json!([
        {"id": 1, "name": "Camiseta", "description": "", "price": 10.0},
        {"id": 2, "name": "Boné", "description": "", "price": 5.0}
    ])
}

fn created_order() -> Canned {
    Canned::json(
        201,
        &json!({
            "id": 42,
            "customer": "Ana",
            "total": 25.0,
            "items": [
                {"product_id": 1, "quantity": 2, "price": 10.0},
                {"product_id": 2, "quantity": 1, "price": 5.0}
            ]
        }),
    )
}

async fn state_for(
    mock: &MockApi,
    storage: MemoryStore,
) -> AppState<HttpStorefrontApi, MemoryStore> {
    let config = mock.config().unwrap();
    let api = HttpStorefrontApi::new(&config).unwrap();
    let mut state = AppState::new(config, api, storage);
    state.load_catalog().await;
    state
}

fn fill_cart(state: &mut AppState<HttpStorefrontApi, MemoryStore>) {
    let cart = state.cart_mut();
    cart.set(ProductId::new(1), 2);
    cart.set(ProductId::new(2), 1);
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_successful_order_clears_cart() {
    let mock = MockApi::start(Canned::json(200, &priced_products()), created_order())
        .await
        .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);

    let receipt = state.checkout("Ana").await.unwrap();

    assert_eq!(receipt.id, OrderId::new(42));
    assert_eq!(receipt.total, Price::from_cents(2500));
    assert_eq!(
        mock.received_orders(),
        [json!({
            "customer": "Ana",
            "items": [
                {"product_id": 1, "quantity": 2},
                {"product_id": 2, "quantity": 1}
            ]
        })]
    );
    assert!(matches!(state.checkout_state(), CheckoutState::Success(r) if r.id == OrderId::new(42)));
    assert_eq!(state.cart().entries().count(), 0);
    assert_eq!(
        state.cart().storage().get(CART_STORAGE_KEY).unwrap().as_deref(),
        Some("{}")
    );
}

#[tokio::test]
async fn test_customer_name_is_trimmed() {
    let mock = MockApi::start(Canned::json(200, &priced_products()), created_order())
        .await
        .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);

    state.checkout("  Ana  ").await.unwrap();

    assert_eq!(mock.received_orders()[0]["customer"], "Ana");
}

#[tokio::test]
async fn test_stale_entries_are_left_out_of_the_order() {
    let mock = MockApi::start(Canned::json(200, &priced_products()), created_order())
        .await
        .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);
    state.cart_mut().set(ProductId::new(99), 4);

    state.checkout("Ana").await.unwrap();

    let items = mock.received_orders()[0]["items"].clone();
    assert_eq!(items.as_array().unwrap().len(), 2);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_server_detail_is_shown_and_cart_kept() {
    let mock = MockApi::start(
        Canned::json(200, &priced_products()),
        Canned::json(503, &json!({"detail": "out of stock"})),
    )
    .await
    .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);

    let err = state.checkout("Ana").await.unwrap_err();

    assert_eq!(err.user_message(), "out of stock");
    assert!(matches!(err, CheckoutError::Server { status: 503, .. }));
    assert!(matches!(state.checkout_state(), CheckoutState::Failed(_)));
    assert_eq!(state.cart().get(ProductId::new(1)), 2);
    assert_eq!(state.cart().get(ProductId::new(2)), 1);
}

#[tokio::test]
async fn test_non_string_detail_gets_generic_message() {
    let mock = MockApi::start(
        Canned::json(200, &priced_products()),
        Canned::json(
            422,
            &json!({"detail": [{"loc": ["body", "items"], "msg": "field required"}]}),
        ),
    )
    .await
    .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);

    let err = state.checkout("Ana").await.unwrap_err();

    assert_eq!(err.user_message(), GENERIC_ORDER_FAILURE);
    assert_eq!(state.cart().get(ProductId::new(1)), 2);
}

#[tokio::test]
async fn test_unreadable_success_body_gets_generic_message() {
    let mock = MockApi::start(
        Canned::json(200, &priced_products()),
        Canned::text(201, "created"),
    )
    .await
    .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);

    let err = state.checkout("Ana").await.unwrap_err();

    assert!(matches!(err, CheckoutError::Decode(_)));
    assert_eq!(err.user_message(), GENERIC_ORDER_FAILURE);
    assert_eq!(state.cart().entries().count(), 2);
}

#[tokio::test]
async fn test_unreachable_server_gets_connectivity_message() {
    let config = StorefrontConfig::for_api(&unreachable_url().await.unwrap()).unwrap();
    let api = HttpStorefrontApi::new(&config).unwrap();
    let mut state = AppState::new(config, api, MemoryStore::new());
    state.cart_mut().add(ProductId::new(1));

    // The catalog falls back, so product 1 is still orderable.
    let err = state.checkout("Ana").await.unwrap_err();

    assert!(matches!(err, CheckoutError::Transport(_)));
    assert_eq!(err.user_message(), CONNECTIVITY_FAILURE);
    assert!(state.catalog().unwrap().is_fallback());
    assert_eq!(state.cart().get(ProductId::new(1)), 1);
}

#[tokio::test]
async fn test_broken_success_body_is_not_a_connectivity_failure() {
    let config = StorefrontConfig::for_api(&truncated_body_url().await.unwrap()).unwrap();
    let api = HttpStorefrontApi::new(&config).unwrap();
    let mut state = AppState::new(config, api, MemoryStore::new());
    state.cart_mut().add(ProductId::new(1));

    let err = state.checkout("Ana").await.unwrap_err();

    assert!(matches!(err, CheckoutError::Decode(_)));
    assert_eq!(err.user_message(), GENERIC_ORDER_FAILURE);
    assert_eq!(state.cart().get(ProductId::new(1)), 1);
}

#[tokio::test]
async fn test_retry_after_failure_succeeds() {
    let mock = MockApi::start(
        Canned::json(200, &priced_products()),
        Canned::json(503, &json!({"detail": "out of stock"})),
    )
    .await
    .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;
    fill_cart(&mut state);

    assert!(state.checkout("Ana").await.is_err());

    mock.respond_to_orders(created_order());
    let receipt = state.checkout("Ana").await.unwrap();

    assert_eq!(receipt.total, Price::from_cents(2500));
    assert_eq!(mock.received_orders().len(), 2);
    assert_eq!(mock.received_orders()[0], mock.received_orders()[1]);
    assert_eq!(state.cart().entries().count(), 0);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_validation_failures_send_nothing() {
    let mock = MockApi::start(Canned::json(200, &priced_products()), created_order())
        .await
        .unwrap();
    let mut state = state_for(&mock, MemoryStore::new()).await;

    let err = state.checkout("Ana").await.unwrap_err();
    assert_eq!(err.user_message(), "Carrinho vazio");

    fill_cart(&mut state);
    let err = state.checkout("   ").await.unwrap_err();
    assert_eq!(err.user_message(), "Preencha nome do cliente");
    assert!(err.is_validation());

    assert!(matches!(state.checkout_state(), CheckoutState::Idle));
    assert!(mock.received_orders().is_empty());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_file_backed_cart_survives_restart() {
    let mock = MockApi::start(Canned::json(200, &priced_products()), created_order())
        .await
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut config = mock.config().unwrap();
    config.cart_dir = dir.path().to_path_buf();

    {
        let mut state = AppState::from_config(config.clone()).unwrap();
        state.cart_mut().set(ProductId::new(1), 2);
        state.cart_mut().add(ProductId::new(2));
    }

    let mut state = AppState::from_config(config.clone()).unwrap();
    assert_eq!(state.cart().get(ProductId::new(1)), 2);
    assert_eq!(state.cart().get(ProductId::new(2)), 1);

    state.checkout("Ana").await.unwrap();

    let reopened = FileStore::new(config.cart_dir);
    assert_eq!(reopened.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("{}"));
}
