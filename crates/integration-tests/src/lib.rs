//! Integration tests for Mini Vendas.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mini-vendas-integration-tests
//! ```
//!
//! The tests need no external services: [`MockApi`] serves `GET /products`
//! and `POST /orders` from an in-process axum server on an ephemeral port,
//! with canned responses, and records every order body it receives.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mini_vendas_storefront::config::StorefrontConfig;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub body: String,
}

impl Canned {
    /// A JSON response with the given status.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_string(),
        }
    }

    /// A raw-text response with the given status.
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_string(),
        }
    }

    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// The three products the backend seeds on first start.
#[must_use]
pub fn seed_products() -> Value {
    json!([
        {"id": 1, "name": "Camiseta", "description": "Camiseta 100% algodão", "price": 39.9},
        {"id": 2, "name": "Boné", "description": "Boné com logo", "price": 29.5},
        {"id": 3, "name": "Caneca", "description": "Caneca cerâmica 300ml", "price": 19.0}
    ])
}

#[derive(Default)]
struct MockState {
    products: Mutex<Option<Canned>>,
    orders: Mutex<Option<Canned>>,
    received_orders: Mutex<Vec<Value>>,
}

/// In-process stand-in for the products/orders API.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    /// Start a server answering `GET /products` with `products` and
    /// `POST /orders` with `orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(products: Canned, orders: Canned) -> io::Result<Self> {
        let state = Arc::new(MockState {
            products: Mutex::new(Some(products)),
            orders: Mutex::new(Some(orders)),
            received_orders: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/orders", post(create_order))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state })
    }

    /// Base URL of the server.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is rejected (never for a bound address).
    pub fn config(&self) -> Result<StorefrontConfig, mini_vendas_storefront::config::ConfigError> {
        StorefrontConfig::for_api(&self.url())
    }

    /// Replace the response for subsequent `POST /orders`.
    pub fn respond_to_orders(&self, canned: Canned) {
        *self
            .state
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(canned);
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn received_orders(&self) -> Vec<Value> {
        self.state
            .received_orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A base URL nothing is listening on.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn unreachable_url() -> io::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// A base URL whose server answers every request with a success status and
/// then hangs up halfway through the promised body.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn truncated_body_url() -> io::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = answer_truncated(socket).await;
            });
        }
    });
    Ok(format!("http://{addr}"))
}

async fn answer_truncated(mut socket: TcpStream) -> io::Result<()> {
    read_request(&mut socket).await?;
    socket
        .write_all(
            b"HTTP/1.1 201 Created\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"id\": 42, \"to",
        )
        .await?;
    socket.flush().await?;
    socket.shutdown().await
}

/// Consume one request (headers plus `content-length` bytes of body).
async fn read_request(socket: &mut TcpStream) -> io::Result<()> {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(chunk.get(..n).unwrap_or_default());

        let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(request.get(..head_end).unwrap_or_default());
        let body_len = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= head_end + 4 + body_len {
            return Ok(());
        }
    }
}

async fn list_products(State(state): State<Arc<MockState>>) -> Response {
    canned(&state.products)
}

async fn create_order(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state
        .received_orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body);
    canned(&state.orders)
}

fn canned(slot: &Mutex<Option<Canned>>) -> Response {
    slot.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .map_or_else(
            || StatusCode::NOT_FOUND.into_response(),
            Canned::into_response,
        )
}
