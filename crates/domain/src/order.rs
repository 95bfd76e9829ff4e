//! Order request and result values.
//!
//! Everything here is request-scoped: built when a PlaceOrder call starts and
//! dropped once the response or error has been returned.

use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, OrderError};
use crate::money::Money;
use crate::product::ProductId;

/// A line in a user's cart.
///
/// Quantity must be positive. Deserialization rejects zero; values built in
/// code are checked with [`CartItem::validate`] before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartItemParts")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Deserialize)]
struct CartItemParts {
    product_id: ProductId,
    quantity: u32,
}

impl TryFrom<CartItemParts> for CartItem {
    type Error = OrderError;

    fn try_from(parts: CartItemParts) -> Result<Self, Self::Error> {
        let item = CartItem::new(parts.product_id, parts.quantity);
        item.validate()?;
        Ok(item)
    }
}

impl CartItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Fails for a zero quantity.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity == 0 {
            return Err(OrderError::ZeroQuantity {
                product_id: self.product_id.to_string(),
            });
        }
        Ok(())
    }
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item: CartItem,

    /// Price per unit in the buyer's currency.
    pub cost: Money,
}

impl OrderItem {
    pub fn new(item: CartItem, cost: Money) -> Self {
        Self { item, cost }
    }

    /// Returns the line total (cost * quantity).
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.cost.multiply(self.item.quantity)
    }
}

/// Shipping destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: i32,
}

/// Payment instrument supplied with the order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub credit_card_number: String,
    pub credit_card_cvv: i32,
    pub credit_card_expiration_year: i32,
    pub credit_card_expiration_month: i32,
}

impl CreditCardInfo {
    /// Last four digits of the card number, for logs.
    pub fn last_four(&self) -> &str {
        let n = &self.credit_card_number;
        let start = n.char_indices().rev().nth(3).map(|(i, _)| i).unwrap_or(0);
        &n[start..]
    }
}

impl std::fmt::Debug for CreditCardInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCardInfo")
            .field("credit_card_number", &format_args!("****{}", self.last_four()))
            .field("credit_card_expiration_year", &self.credit_card_expiration_year)
            .field("credit_card_expiration_month", &self.credit_card_expiration_month)
            .finish_non_exhaustive()
    }
}

/// Input of a PlaceOrder call. The cart is the one owned by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub user_currency: String,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCardInfo,
}

/// Outcome of a successful PlaceOrder call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub shipping_tracking_id: String,
    pub shipping_cost: Money,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
}
