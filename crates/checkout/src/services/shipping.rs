//! Shipping service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::RequestContext;
use domain::{Address, CartItem, Money};

use crate::error::ServiceError;

/// Trait for shipping operations.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Quotes the cost, in USD, of shipping `items` to `address`.
    async fn get_quote(
        &self,
        ctx: &RequestContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError>;

    /// Dispatches `items` to `address` and returns a tracking id.
    async fn ship_order(
        &self,
        ctx: &RequestContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError>;
}

#[derive(Debug)]
struct InMemoryShippingState {
    quote: Money,
    quotes_issued: usize,
    shipments: Vec<(String, Address)>,
    next_id: u32,
    fail_on_quote: bool,
    fail_on_ship: bool,
}

impl Default for InMemoryShippingState {
    fn default() -> Self {
        Self {
            quote: Money::from_units("USD", 0),
            quotes_issued: 0,
            shipments: Vec::new(),
            next_id: 0,
            fail_on_quote: false,
            fail_on_ship: false,
        }
    }
}

/// In-memory shipping service for testing.
///
/// Every quote returns the configured flat USD amount.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingService {
    /// Creates a new in-memory shipping service quoting zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service quoting `quote_usd` for every order.
    pub fn with_quote(quote_usd: Money) -> Self {
        let service = Self::default();
        service.set_quote(quote_usd);
        service
    }

    /// Sets the flat quote.
    pub fn set_quote(&self, quote_usd: Money) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).quote = quote_usd;
    }

    /// Configures the service to fail on get_quote calls.
    pub fn set_fail_on_quote(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_quote = fail;
    }

    /// Configures the service to fail on ship_order calls.
    pub fn set_fail_on_ship(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_ship = fail;
    }

    /// Returns the number of quotes issued.
    pub fn quotes_issued(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).quotes_issued
    }

    /// Returns the number of dispatched shipments.
    pub fn shipment_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).shipments.len()
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn get_quote(
        &self,
        _ctx: &RequestContext,
        _address: &Address,
        _items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_quote {
            return Err(ServiceError::call("shipping", "quote unavailable"));
        }

        state.quotes_issued += 1;
        Ok(state.quote.clone())
    }

    async fn ship_order(
        &self,
        _ctx: &RequestContext,
        address: &Address,
        _items: &[CartItem],
    ) -> Result<String, ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_ship {
            return Err(ServiceError::call("shipping", "shipping unavailable"));
        }

        state.next_id += 1;
        let tracking_id = format!("TRACK-{:04}", state.next_id);
        state.shipments.push((tracking_id.clone(), address.clone()));

        Ok(tracking_id)
    }
}
