//! In-memory marketplace for testing.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::RequestContext;
use domain::{OrderResult, OriginResolver, ProductId};

use super::{ExternalOrder, MarketplaceBridge};
use crate::error::BridgeError;

#[derive(Debug, Default)]
struct InMemoryMarketplaceState {
    listed: HashSet<ProductId>,
    exists_calls: Vec<ProductId>,
    relayed: Vec<ExternalOrder>,
    fail_on_exists: bool,
    fail_on_relay: bool,
}

/// In-memory marketplace with failure injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketplace {
    state: Arc<RwLock<InMemoryMarketplaceState>>,
    resolver: OriginResolver,
}

impl InMemoryMarketplace {
    /// Creates a marketplace that lists nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a marketplace that filters relayed orders with `resolver`.
    pub fn with_resolver(resolver: OriginResolver) -> Self {
        Self {
            state: Arc::default(),
            resolver,
        }
    }

    /// Lists a product.
    pub fn list_product(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .listed
            .insert(product_id.into());
    }

    /// Configures existence checks to fail as if the marketplace were down.
    pub fn set_fail_on_exists(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_exists = fail;
    }

    /// Configures relays to fail.
    pub fn set_fail_on_relay(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_relay = fail;
    }

    /// Returns the ids checked so far, in call order.
    pub fn exists_calls(&self) -> Vec<ProductId> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .exists_calls
            .clone()
    }

    /// Returns the payloads accepted so far.
    pub fn relayed(&self) -> Vec<ExternalOrder> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .relayed
            .clone()
    }
}

#[async_trait]
impl MarketplaceBridge for InMemoryMarketplace {
    async fn exists(&self, _ctx: &RequestContext, product_id: &ProductId) -> Result<bool, BridgeError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.exists_calls.push(product_id.clone());

        if state.fail_on_exists {
            return Err(BridgeError::Unavailable("connection refused".to_string()));
        }

        Ok(state.listed.contains(product_id))
    }

    async fn relay(&self, _ctx: &RequestContext, order: &OrderResult) -> Result<(), BridgeError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_relay {
            return Err(BridgeError::Status(502));
        }

        state.relayed.push(ExternalOrder::from_order(order, &self.resolver));
        Ok(())
    }
}
