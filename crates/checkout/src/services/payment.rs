//! Payment service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::RequestContext;
use domain::{CreditCardInfo, Money};

use crate::error::ServiceError;

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges `amount` to the card and returns a transaction id.
    async fn charge(
        &self,
        ctx: &RequestContext,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<String, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charges: Vec<(String, Money)>,
    next_id: u32,
    fail_on_charge: bool,
}

/// In-memory payment service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline every charge.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_charge = fail;
    }

    /// Returns the number of successful charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).charges.len()
    }

    /// Returns the charged amounts, in call order.
    pub fn charged_amounts(&self) -> Vec<Money> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .charges
            .iter()
            .map(|(_, amount)| amount.clone())
            .collect()
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn charge(
        &self,
        _ctx: &RequestContext,
        amount: &Money,
        _card: &CreditCardInfo,
    ) -> Result<String, ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_charge {
            return Err(ServiceError::call("payment", "payment declined"));
        }

        state.next_id += 1;
        let transaction_id = format!("TXN-{:04}", state.next_id);
        state.charges.push((transaction_id.clone(), amount.clone()));

        Ok(transaction_id)
    }
}
