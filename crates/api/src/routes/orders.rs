//! PlaceOrder endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use checkout::{CheckoutCoordinator, PlaceOrderResponse};
use common::RequestContext;
use domain::PlaceOrderRequest;

use crate::error::ApiError;
use crate::shops::ShopDirectory;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub coordinator: CheckoutCoordinator,
    pub shops: ShopDirectory,

    /// Deadline applied to each PlaceOrder call.
    pub request_timeout: Duration,
}

/// POST /orders: places an order for the caller's cart.
#[tracing::instrument(skip(state, body))]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    tracing::info!(user_id = %req.user_id, user_currency = %req.user_currency, "PlaceOrder");

    let ctx = RequestContext::background().with_timeout(state.request_timeout);
    let response = state.coordinator.place_order(&ctx, &req).await?;

    Ok(Json(response))
}
