//! Step names used in logs and metric labels.

/// Load the user's cart.
pub const STEP_FETCH_CART: &str = "fetch_cart";

/// Price every cart line in the buyer's currency.
pub const STEP_PRICE_ITEMS: &str = "price_items";

/// Quote shipping and convert it to the buyer's currency.
pub const STEP_QUOTE_SHIPPING: &str = "quote_shipping";

/// Charge the order total.
pub const STEP_CHARGE: &str = "charge";

/// Dispatch the shipment.
pub const STEP_SHIP_ORDER: &str = "ship_order";

/// Empty the cart (best-effort).
pub const STEP_EMPTY_CART: &str = "empty_cart";

/// Send the confirmation email (best-effort).
pub const STEP_SEND_CONFIRMATION: &str = "send_confirmation";

/// Relay external lines to the marketplace (best-effort).
pub const STEP_RELAY_ORDER: &str = "relay_order";
