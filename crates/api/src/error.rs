//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{BridgeError, CheckoutError, ErrorCode};
use domain::MoneyError;
use thiserror::Error;

use crate::shops::ShopsError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read as a PlaceOrder request.
    #[error("{0}")]
    BadRequest(String),

    /// PlaceOrder failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The endpoint exists but is not served.
    #[error("{0}")]
    Unimplemented(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            ApiError::Checkout(err) => match err.code() {
                ErrorCode::Internal => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal.as_str()),
                ErrorCode::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::Unavailable.as_str()),
            },
            ApiError::Unimplemented(_) => (StatusCode::NOT_IMPLEMENTED, "UNIMPLEMENTED"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(%code, error = %self, "request failed");
        }

        let body = serde_json::json!({ "code": code, "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Failures while building the application at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load shop directory: {0}")]
    Shops(#[from] ShopsError),

    #[error("failed to build marketplace client: {0}")]
    Marketplace(#[from] BridgeError),

    #[error("invalid demo catalog price: {0}")]
    Catalog(#[from] MoneyError),
}
