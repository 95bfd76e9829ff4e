//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::RequestContext;
use domain::{Money, ProductId};

use crate::error::ServiceError;

/// A catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Advertised price in USD.
    pub price_usd: Money,
}

/// Trait for product catalog lookups.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Looks up a product by id.
    async fn get_product(&self, ctx: &RequestContext, id: &ProductId) -> Result<Product, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    lookups: Vec<ProductId>,
    fail_on_get: bool,
}

/// In-memory product catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn add_product(&self, id: impl Into<ProductId>, name: impl Into<String>, price_usd: Money) {
        let id = id.into();
        let product = Product {
            id: id.clone(),
            name: name.into(),
            price_usd,
        };
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .insert(id, product);
    }

    /// Configures the service to fail on every lookup.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_get = fail;
    }

    /// Returns the ids looked up so far, in call order.
    pub fn lookups(&self) -> Vec<ProductId> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookups
            .clone()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_product(&self, _ctx: &RequestContext, id: &ProductId) -> Result<Product, ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.lookups.push(id.clone());

        if state.fail_on_get {
            return Err(ServiceError::call("catalog", "catalog unavailable"));
        }

        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::call("catalog", format!("no product with id {id}")))
    }
}
