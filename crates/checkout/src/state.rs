//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of one PlaceOrder run.
///
/// State transitions:
/// ```text
/// Start ──► CartFetched ──► Priced ──► Quoted ──► Converted ──► Charged ──► Shipped
///   │            │            │                      │             │
///   ▼            ▼            ▼                      ▼             ▼
/// AbortedCart  AbortedPricing AbortedShipping  AbortedPayment  AbortedShippingDispatch
///
/// Shipped ──► CartCleared | CartClearFailed
///         ──► Notified | NotifyFailed
///         ──► Relayed | RelaySkipped ──► Done
/// ```
///
/// Nothing after `Charged` ever reverses the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    #[default]
    Start,
    CartFetched,
    Priced,
    Quoted,
    Converted,
    Charged,
    Shipped,
    CartCleared,
    CartClearFailed,
    Notified,
    NotifyFailed,
    Relayed,
    RelaySkipped,
    Done,

    AbortedCartFailure,
    AbortedPricingFailure,
    AbortedShippingFailure,
    AbortedPaymentFailure,
    AbortedShippingDispatchFailure,
}

impl CheckoutState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: CheckoutState) -> bool {
        use CheckoutState::*;

        matches!(
            (self, next),
            (Start, CartFetched)
                | (Start, AbortedCartFailure)
                | (CartFetched, Priced)
                | (CartFetched, AbortedPricingFailure)
                | (Priced, Quoted)
                | (Priced, AbortedShippingFailure)
                | (Quoted, Converted)
                | (Quoted, AbortedShippingFailure)
                | (Converted, Charged)
                | (Converted, AbortedPaymentFailure)
                | (Charged, Shipped)
                | (Charged, AbortedShippingDispatchFailure)
                | (Shipped, CartCleared | CartClearFailed)
                | (CartCleared | CartClearFailed, Notified | NotifyFailed)
                | (Notified | NotifyFailed, Relayed | RelaySkipped)
                | (Relayed | RelaySkipped, Done)
        )
    }

    /// Returns true for `Done` and every aborted state.
    pub fn is_terminal(&self) -> bool {
        *self == CheckoutState::Done || self.is_aborted()
    }

    /// Returns true for the failure states that end a run without a response.
    pub fn is_aborted(&self) -> bool {
        matches!(
            self,
            CheckoutState::AbortedCartFailure
                | CheckoutState::AbortedPricingFailure
                | CheckoutState::AbortedShippingFailure
                | CheckoutState::AbortedPaymentFailure
                | CheckoutState::AbortedShippingDispatchFailure
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Start => "Start",
            CheckoutState::CartFetched => "CartFetched",
            CheckoutState::Priced => "Priced",
            CheckoutState::Quoted => "Quoted",
            CheckoutState::Converted => "Converted",
            CheckoutState::Charged => "Charged",
            CheckoutState::Shipped => "Shipped",
            CheckoutState::CartCleared => "CartCleared",
            CheckoutState::CartClearFailed => "CartClearFailed",
            CheckoutState::Notified => "Notified",
            CheckoutState::NotifyFailed => "NotifyFailed",
            CheckoutState::Relayed => "Relayed",
            CheckoutState::RelaySkipped => "RelaySkipped",
            CheckoutState::Done => "Done",
            CheckoutState::AbortedCartFailure => "AbortedCartFailure",
            CheckoutState::AbortedPricingFailure => "AbortedPricingFailure",
            CheckoutState::AbortedShippingFailure => "AbortedShippingFailure",
            CheckoutState::AbortedPaymentFailure => "AbortedPaymentFailure",
            CheckoutState::AbortedShippingDispatchFailure => "AbortedShippingDispatchFailure",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Records the states one run passes through.
#[derive(Debug, Clone, Default)]
pub struct CheckoutProgress {
    state: CheckoutState,
    trail: Vec<CheckoutState>,
}

impl CheckoutProgress {
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Start,
            trail: vec![CheckoutState::Start],
        }
    }

    /// The current state.
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Every state visited so far, starting with `Start`.
    pub fn trail(&self) -> &[CheckoutState] {
        &self.trail
    }

    pub fn into_trail(self) -> Vec<CheckoutState> {
        self.trail
    }

    /// Moves to `next`.
    pub fn advance(&mut self, next: CheckoutState) {
        let legal = self.state.can_transition_to(next);
        debug_assert!(legal, "illegal checkout transition {} -> {}", self.state, next);
        if !legal {
            tracing::warn!(from = %self.state, to = %next, "unexpected checkout transition");
        }
        tracing::debug!(from = %self.state, to = %next, "checkout state changed");
        self.state = next;
        self.trail.push(next);
    }
}
