//! Checkout errors and the messages shown for them.
//!
//! Nothing here is fatal: every variant ends in a message for the visitor and
//! a cart that is still usable, so the order can be retried.

use thiserror::Error;

use crate::api::ApiError;

/// Shown when the server rejects an order without a readable reason.
pub const GENERIC_ORDER_FAILURE: &str = "não foi possível criar pedido";

/// Shown when the server could not be reached at all.
pub const CONNECTIVITY_FAILURE: &str = "não foi possível conectar ao servidor";

/// Problems detected locally, before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Preencha nome do cliente")]
    MissingCustomer,
    #[error("Carrinho vazio")]
    EmptyCart,
}

/// Why a checkout attempt did not produce an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Blocked before submission.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The request never got a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a failure.
    #[error("Server error: HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The server accepted the order but its reply could not be read.
    #[error("Unreadable response: {0}")]
    Decode(String),
}

impl CheckoutError {
    /// Text to show the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Transport(_) => CONNECTIVITY_FAILURE.to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Decode(_) => GENERIC_ORDER_FAILURE.to_string(),
        }
    }

    /// Whether the failure happened before anything was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => Self::Transport(e.to_string()),
            ApiError::Server { status, detail } => Self::Server {
                status,
                message: detail
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_ORDER_FAILURE.to_string()),
            },
            ApiError::Decode(e) => Self::Decode(e),
            ApiError::InvalidUrl(e) => Self::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            CheckoutError::from(ValidationError::MissingCustomer).user_message(),
            "Preencha nome do cliente"
        );
        assert_eq!(
            CheckoutError::from(ValidationError::EmptyCart).user_message(),
            "Carrinho vazio"
        );
    }

    #[test]
    fn test_server_detail_becomes_message() {
        let err = CheckoutError::from(ApiError::Server {
            status: 503,
            detail: Some("out of stock".to_string()),
        });
        assert_eq!(err.user_message(), "out of stock");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_server_without_detail_uses_generic_message() {
        let err = CheckoutError::from(ApiError::Server {
            status: 500,
            detail: None,
        });
        assert_eq!(err.user_message(), GENERIC_ORDER_FAILURE);

        let err = CheckoutError::from(ApiError::Server {
            status: 400,
            detail: Some("  ".to_string()),
        });
        assert_eq!(err.user_message(), GENERIC_ORDER_FAILURE);
    }

    #[test]
    fn test_transport_uses_connectivity_message() {
        let err = CheckoutError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), CONNECTIVITY_FAILURE);
    }
}
