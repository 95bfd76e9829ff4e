//! Cart service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::RequestContext;
use domain::CartItem;

use crate::error::ServiceError;

/// Trait for cart storage operations.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Returns the items in the user's cart, in cart order.
    async fn get_cart(&self, ctx: &RequestContext, user_id: &str) -> Result<Vec<CartItem>, ServiceError>;

    /// Removes every item from the user's cart.
    async fn empty_cart(&self, ctx: &RequestContext, user_id: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<String, Vec<CartItem>>,
    fail_on_get: bool,
    fail_on_empty: bool,
    empty_calls: usize,
}

/// In-memory cart service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates a new in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item to the user's cart.
    pub fn add_item(&self, user_id: &str, item: CartItem) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.carts.entry(user_id.to_string()).or_default().push(item);
    }

    /// Configures the service to fail on get_cart calls.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_get = fail;
    }

    /// Configures the service to fail on empty_cart calls.
    pub fn set_fail_on_empty(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_empty = fail;
    }

    /// Returns a copy of the user's cart.
    pub fn cart(&self, user_id: &str) -> Vec<CartItem> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns how many times empty_cart was called.
    pub fn empty_calls(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).empty_calls
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn get_cart(&self, _ctx: &RequestContext, user_id: &str) -> Result<Vec<CartItem>, ServiceError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_get {
            return Err(ServiceError::call("cart", "cart storage unavailable"));
        }

        Ok(state.carts.get(user_id).cloned().unwrap_or_default())
    }

    async fn empty_cart(&self, _ctx: &RequestContext, user_id: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.empty_calls += 1;

        if state.fail_on_empty {
            return Err(ServiceError::call("cart", "failed to empty cart"));
        }

        state.carts.remove(user_id);
        Ok(())
    }
}
