//! Domain layer for the checkout system.
//!
//! This crate provides the values a checkout works with:
//! - [`Money`] with exact fixed-point arithmetic
//! - [`ProductId`] and the [`OriginResolver`] that tells internal catalog
//!   products apart from external marketplace listings
//! - Order request and result types

pub mod error;
pub mod money;
pub mod order;
pub mod product;

pub use error::{MoneyError, OrderError, ProductIdError};
pub use money::{Money, NANOS_PER_UNIT};
pub use order::{Address, CartItem, CreditCardInfo, OrderItem, OrderResult, PlaceOrderRequest};
pub use product::{DEFAULT_INTERNAL_STORE_ID, OriginResolver, ProductId, ProductOrigin};
