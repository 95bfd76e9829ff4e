//! Checkout error types.

use common::ContextError;
use domain::{MoneyError, OrderError, ProductId, ProductIdError};
use thiserror::Error;

use crate::state::CheckoutState;

/// Coarse status reported to PlaceOrder callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Pricing, payment and cart failures.
    Internal,
    /// Shipping quote and dispatch failures.
    Unavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a downstream service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with an error or could not be reached.
    #[error("{service} service error: {message}")]
    Call {
        service: &'static str,
        message: String,
    },

    /// The request was cancelled or ran out of time while waiting.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ServiceError {
    pub fn call(service: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Call {
            service,
            message: message.into(),
        }
    }
}

/// Failure talking to the external marketplace.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The HTTP request could not be sent or its body not read.
    #[error("Marketplace request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The marketplace answered with a non-success status.
    #[error("Marketplace returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected envelope.
    #[error("Marketplace response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot address a product.
    #[error("Invalid marketplace URL {0:?}")]
    InvalidUrl(String),

    /// The marketplace is not reachable.
    #[error("Marketplace unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Errors that abort a PlaceOrder call.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user's cart could not be loaded.
    #[error("cart failure: {0}")]
    CartFetch(ServiceError),

    /// A cart line carries an id without a store prefix.
    #[error("failed to prepare order: {0}")]
    MalformedProductId(#[from] ProductIdError),

    /// A cart line is not orderable as stored, e.g. a zero quantity.
    #[error("failed to prepare order: {0}")]
    InvalidCartLine(#[from] OrderError),

    /// An external product could not be confirmed by its marketplace.
    #[error("failed to get external product {product_id:?}: {reason}")]
    ExternalProductUnavailable {
        product_id: ProductId,
        reason: String,
    },

    /// Price lookup or conversion failed for a cart line.
    #[error("failed to prepare order: could not price {product_id:?}: {source}")]
    Pricing {
        product_id: ProductId,
        source: ServiceError,
    },

    /// No shipping quote in the buyer's currency could be produced.
    #[error("shipping quote failure: {0}")]
    ShippingQuote(ServiceError),

    /// The order total could not be computed, e.g. a currency mismatch.
    #[error("failed to compute order total: {0}")]
    Money(#[from] MoneyError),

    /// The card charge failed.
    #[error("failed to charge card: {0}")]
    Payment(ServiceError),

    /// The paid order could not be shipped.
    #[error("shipping error: {0}")]
    ShippingDispatch(ServiceError),
}

impl CheckoutError {
    /// The status reported to the caller.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::ShippingQuote(_) | CheckoutError::ShippingDispatch(_) => {
                ErrorCode::Unavailable
            }
            _ => ErrorCode::Internal,
        }
    }

    /// The terminal state a run ends in when it fails with this error.
    pub fn aborted_state(&self) -> CheckoutState {
        match self {
            CheckoutError::CartFetch(_) => CheckoutState::AbortedCartFailure,
            CheckoutError::MalformedProductId(_)
            | CheckoutError::InvalidCartLine(_)
            | CheckoutError::ExternalProductUnavailable { .. }
            | CheckoutError::Pricing { .. } => CheckoutState::AbortedPricingFailure,
            CheckoutError::ShippingQuote(_) => CheckoutState::AbortedShippingFailure,
            CheckoutError::Money(_) | CheckoutError::Payment(_) => {
                CheckoutState::AbortedPaymentFailure
            }
            CheckoutError::ShippingDispatch(_) => CheckoutState::AbortedShippingDispatchFailure,
        }
    }
}
