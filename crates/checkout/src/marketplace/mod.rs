//! Bridge to the external marketplace.
//!
//! The marketplace speaks plain JSON over HTTP:
//! - `GET {base}/product/{id}` answers an [`ExistenceEnvelope`]
//! - `POST {base}/order` accepts an [`ExternalOrder`] holding only the lines
//!   sold by external stores

pub mod http;
pub mod memory;

use async_trait::async_trait;
use common::RequestContext;
use domain::{Address, Money, OrderResult, OriginResolver, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

pub use http::HttpMarketplaceBridge;
pub use memory::InMemoryMarketplace;

/// `status` value meaning the product is listed.
pub const STATUS_SUCCESS: &str = "Success";

/// Trait for marketplace lookups and order relay.
#[async_trait]
pub trait MarketplaceBridge: Send + Sync {
    /// Returns true if the marketplace lists `product_id`.
    async fn exists(&self, ctx: &RequestContext, product_id: &ProductId) -> Result<bool, BridgeError>;

    /// Forwards the externally sourced part of `order`.
    async fn relay(&self, ctx: &RequestContext, order: &OrderResult) -> Result<(), BridgeError>;
}

/// Response body of the existence endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeData {
    #[serde(default)]
    pub result: String,
}

impl ExistenceEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Money in the marketplace's field naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalMoney {
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl From<&Money> for ExternalMoney {
    fn from(money: &Money) -> Self {
        Self {
            currency_code: money.currency_code().to_string(),
            units: money.units(),
            nanos: money.nanos(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAddress {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: i32,
}

impl From<&Address> for ExternalAddress {
    fn from(address: &Address) -> Self {
        Self {
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            country: address.country.clone(),
            zip_code: address.zip_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalOrderItem {
    /// Full `<store>:<local>` product id.
    pub item: String,
    pub cost: ExternalMoney,
}

/// Order payload relayed to the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalOrder {
    pub order_id: String,
    pub shipping_tracking_id: String,
    pub shipping_cost: ExternalMoney,
    pub shipping_address: ExternalAddress,
    pub items: Vec<ExternalOrderItem>,
}

impl ExternalOrder {
    /// Builds the payload for `order`, dropping internal catalog lines.
    pub fn from_order(order: &OrderResult, resolver: &OriginResolver) -> Self {
        let items = order
            .items
            .iter()
            .filter(|line| resolver.is_external(&line.item.product_id))
            .map(|line| ExternalOrderItem {
                item: line.item.product_id.to_string(),
                cost: ExternalMoney::from(&line.cost),
            })
            .collect();

        Self {
            order_id: order.order_id.to_string(),
            shipping_tracking_id: order.shipping_tracking_id.clone(),
            shipping_cost: ExternalMoney::from(&order.shipping_cost),
            shipping_address: ExternalAddress::from(&order.shipping_address),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use common::OrderId;
    use domain::{CartItem, OrderItem};

    use super::*;

    fn order() -> OrderResult {
        OrderResult {
            order_id: OrderId::new(),
            shipping_tracking_id: "TRACK-0001".to_string(),
            shipping_cost: Money::new("EUR", 4, 500_000_000).unwrap(),
            shipping_address: Address {
                street_address: "Mannerheimintie 1".to_string(),
                city: "Helsinki".to_string(),
                state: "Uusimaa".to_string(),
                country: "Finland".to_string(),
                zip_code: 100,
            },
            items: vec![
                OrderItem::new(CartItem::new("ONBQ:9SIQT8TOJO", 1), Money::from_units("EUR", 10)),
                OrderItem::new(CartItem::new("ACME:hat", 2), Money::new("EUR", 3, 250_000_000).unwrap()),
            ],
        }
    }

    #[test]
    fn test_payload_keeps_only_external_lines() {
        let order = order();
        let payload = ExternalOrder::from_order(&order, &OriginResolver::default());

        assert_eq!(payload.order_id, order.order_id.to_string());
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.items[0].item, "ACME:hat");
        assert_eq!(payload.items[0].cost.units, 3);
        assert_eq!(payload.items[0].cost.nanos, 250_000_000);
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = ExternalOrder::from_order(&order(), &OriginResolver::default());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["shipping_cost"]["CurrencyCode"], "EUR");
        assert_eq!(json["shipping_cost"]["Units"], 4);
        assert_eq!(json["shipping_cost"]["Nanos"], 500_000_000);
        assert_eq!(json["shipping_address"]["zip_code"], 100);
        assert_eq!(json["items"][0]["item"], "ACME:hat");
        assert_eq!(json["items"][0]["cost"]["CurrencyCode"], "EUR");
    }

    #[test]
    fn test_envelope_success_only_on_status() {
        let listed: ExistenceEnvelope = serde_json::from_str(
            r#"{"status":"Success","message":"ok","data":{"result":"found"}}"#,
        )
        .unwrap();
        assert!(listed.is_success());

        let other: ExistenceEnvelope = serde_json::from_str(
            r#"{"status":"OK","message":"Request processed successfully.","data":{"result":"Success"}}"#,
        )
        .unwrap();
        assert!(!other.is_success());
    }
}
