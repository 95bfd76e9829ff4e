//! Domain error types.

use thiserror::Error;

/// Errors raised by [`Money`](crate::Money) arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The operands are in different currencies.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// Units and nanos do not form a valid amount.
    #[error("Invalid money value: units={units} nanos={nanos}")]
    InvalidValue { units: i64, nanos: i32 },

    /// The result does not fit in 64-bit units.
    #[error("Money overflow")]
    Overflow,
}

/// Errors raised while interpreting a product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductIdError {
    /// The id has no `<store>:<local>` separator.
    #[error("Malformed product id {0:?}: expected <store_id>:<local_id>")]
    Malformed(String),
}

/// Errors raised while validating order values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// A cart line asks for no units of its product.
    #[error("Cart line {product_id:?} has zero quantity")]
    ZeroQuantity { product_id: String },
}
