//! Marketplace listing lookup backed by the shop directory.
//!
//! Answers the same envelope the checkout's marketplace bridge reads, so a
//! single binary can act as its own marketplace in development.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::ExistenceEnvelope;
use checkout::marketplace::{EnvelopeData, STATUS_SUCCESS};
use domain::ProductId;

use super::orders::AppState;

const STATUS_FAILED: &str = "Failed";

/// GET /product/{id}: `Success` if the id's store is a known shop.
#[tracing::instrument(skip(state))]
pub async fn product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<ExistenceEnvelope>) {
    let product_id = ProductId::new(id);
    let shop = product_id
        .split()
        .ok()
        .and_then(|(store_id, _)| state.shops.get(store_id));

    match shop {
        Some(shop) => {
            metrics::counter!("marketplace_lookups_total", "outcome" => "found").increment(1);
            let envelope = ExistenceEnvelope {
                status: STATUS_SUCCESS.to_string(),
                message: format!("listed by {}", shop.name),
                data: EnvelopeData {
                    result: shop.id.clone(),
                },
            };
            (StatusCode::OK, Json(envelope))
        }
        None => {
            metrics::counter!("marketplace_lookups_total", "outcome" => "missing").increment(1);
            tracing::debug!(%product_id, "no shop for product");
            let envelope = ExistenceEnvelope {
                status: STATUS_FAILED.to_string(),
                message: format!("no shop lists {product_id}"),
                data: EnvelopeData::default(),
            };
            (StatusCode::NOT_FOUND, Json(envelope))
        }
    }
}
