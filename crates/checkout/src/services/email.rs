//! Email service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::{OrderId, RequestContext};
use domain::OrderResult;

use crate::error::ServiceError;

/// Trait for sending customer emails.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an order confirmation to `email`.
    async fn send_order_confirmation(
        &self,
        ctx: &RequestContext,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryEmailState {
    sent: Vec<(String, OrderId)>,
    fail_on_send: bool,
}

/// In-memory email outbox for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailService {
    state: Arc<RwLock<InMemoryEmailState>>,
}

impl InMemoryEmailService {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_send = fail;
    }

    /// Returns `(recipient, order_id)` for every confirmation sent.
    pub fn sent(&self) -> Vec<(String, OrderId)> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).sent.clone()
    }
}

#[async_trait]
impl EmailService for InMemoryEmailService {
    async fn send_order_confirmation(
        &self,
        _ctx: &RequestContext,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_send {
            return Err(ServiceError::call("email", "smtp relay unavailable"));
        }

        state.sent.push((email.to_string(), order.order_id));
        Ok(())
    }
}
