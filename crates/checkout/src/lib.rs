//! Order placement for the checkout system.
//!
//! This crate coordinates a PlaceOrder call across six downstream services
//! (cart, catalog, currency, shipping, payment, email) and an optional
//! external marketplace:
//! 1. Fetch the cart
//! 2. Price every line in the buyer's currency
//! 3. Quote shipping and convert it
//! 4. Charge the exact total
//! 5. Ship, then clear the cart
//! 6. Send the confirmation email
//! 7. Relay external lines to the marketplace
//!
//! Steps 5 (cart clearing) through 7 are best-effort. Nothing is compensated:
//! once the card is charged the charge stands.

pub mod coordinator;
pub mod error;
pub mod marketplace;
pub mod services;
pub mod state;
pub mod steps;

pub use coordinator::{CheckoutCoordinator, Collaborators, PlaceOrderResponse, order_total};
pub use error::{BridgeError, CheckoutError, ErrorCode, ServiceError};
pub use marketplace::{
    ExistenceEnvelope, ExternalOrder, HttpMarketplaceBridge, InMemoryMarketplace, MarketplaceBridge,
};
pub use services::{
    CartService, CatalogService, CurrencyService, EmailService, InMemoryCartService,
    InMemoryCatalogService, InMemoryCurrencyService, InMemoryEmailService, InMemoryPaymentService,
    InMemoryShippingService, PaymentService, Product, ShippingService,
};
pub use state::{CheckoutProgress, CheckoutState};
