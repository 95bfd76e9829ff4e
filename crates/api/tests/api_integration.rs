//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::InMemoryServices;
use api::config::Config;
use api::shops::{Shop, ShopDirectory};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::InMemoryMarketplace;
use domain::{CartItem, Money};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: axum::Router,
    services: InMemoryServices,
    marketplace: InMemoryMarketplace,
}

fn setup() -> TestApp {
    let config = Config::default();
    let services = InMemoryServices::with_demo_catalog(&config.internal_store_id).unwrap();
    let marketplace = InMemoryMarketplace::new();
    let shops = ShopDirectory::new([Shop {
        name: "Acme Lamps".to_string(),
        id: "ACME".to_string(),
    }]);

    let state = api::create_state(&config, &services, Arc::new(marketplace.clone()), shops);
    let app = api::create_app(state, get_metrics_handle());

    TestApp {
        app,
        services,
        marketplace,
    }
}

fn place_order_body(currency: &str) -> Value {
    json!({
        "user_id": "user-1",
        "user_currency": currency,
        "address": {
            "street_address": "1600 Amphitheatre Parkway",
            "city": "Mountain View",
            "state": "CA",
            "country": "United States",
            "zip_code": 94043
        },
        "email": "someone@example.com",
        "credit_card": {
            "credit_card_number": "4432801561520454",
            "credit_card_cvv": 672,
            "credit_card_expiration_year": 2039,
            "credit_card_expiration_month": 1
        }
    })
}

async fn post_order(app: axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_check() {
    let t = setup();
    let (status, body) = get(t.app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "SERVING");
}

#[tokio::test]
async fn test_health_watch_is_unimplemented() {
    let t = setup();
    let (status, body) = get(t.app, "/health/watch").await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "UNIMPLEMENTED");
}

#[tokio::test]
async fn test_place_order() {
    let t = setup();
    t.services.cart.add_item("user-1", CartItem::new("ONBQ:6E92ZMYYFZ", 2));

    let (status, json) = post_order(t.app, place_order_body("USD").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let order = &json["order"];
    assert_eq!(order["order_id"].as_str().unwrap().len(), 36);
    assert_eq!(order["shipping_tracking_id"], "TRACK-0001");
    assert_eq!(order["shipping_cost"]["units"], 8);
    assert_eq!(order["shipping_cost"]["nanos"], 990_000_000);
    assert_eq!(order["items"][0]["item"]["product_id"], "ONBQ:6E92ZMYYFZ");
    assert_eq!(order["items"][0]["item"]["quantity"], 2);
    assert_eq!(order["shipping_address"]["zip_code"], 94043);

    // 8.99 + 2 * 8.99
    assert_eq!(
        t.services.payment.charged_amounts(),
        vec![Money::new("USD", 26, 970_000_000).unwrap()]
    );
    assert!(t.services.cart.cart("user-1").is_empty());
}

#[tokio::test]
async fn test_place_order_in_euros() {
    let t = setup();
    t.services.cart.add_item("user-1", CartItem::new("ONBQ:9SIQT8TOJO", 1));

    let (status, json) = post_order(t.app, place_order_body("EUR").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["items"][0]["cost"]["currency_code"], "EUR");
    assert_eq!(json["order"]["shipping_cost"]["currency_code"], "EUR");
    assert_eq!(t.services.payment.charged_amounts()[0].currency_code(), "EUR");
}

#[tokio::test]
async fn test_place_order_relays_external_lines() {
    let t = setup();
    t.services
        .catalog
        .add_product("ACME:LAMP", "Desk Lamp", Money::from_units("USD", 30));
    t.marketplace.list_product("ACME:LAMP");
    t.services.cart.add_item("user-1", CartItem::new("ACME:LAMP", 1));

    let (status, _) = post_order(t.app, place_order_body("USD").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.marketplace.relayed().len(), 1);
}

#[tokio::test]
async fn test_unlisted_external_product_is_internal_error() {
    let t = setup();
    t.services.cart.add_item("user-1", CartItem::new("ACME:GONE", 1));

    let (status, json) = post_order(t.app, place_order_body("USD").to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL");
    assert_eq!(t.services.payment.charge_count(), 0);
}

#[tokio::test]
async fn test_shipping_outage_is_unavailable() {
    let t = setup();
    t.services.shipping.set_fail_on_quote(true);
    t.services.cart.add_item("user-1", CartItem::new("ONBQ:6E92ZMYYFZ", 1));

    let (status, json) = post_order(t.app, place_order_body("USD").to_string()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "UNAVAILABLE");
    assert!(json["error"].as_str().unwrap().contains("shipping"));
}

#[tokio::test]
async fn test_payment_failure_is_internal() {
    let t = setup();
    t.services.payment.set_fail_on_charge(true);
    t.services.cart.add_item("user-1", CartItem::new("ONBQ:6E92ZMYYFZ", 1));

    let (status, json) = post_order(t.app, place_order_body("USD").to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL");
}

#[tokio::test]
async fn test_email_failure_still_returns_order() {
    let t = setup();
    t.services.email.set_fail_on_send(true);
    t.services.cart.add_item("user-1", CartItem::new("ONBQ:6E92ZMYYFZ", 1));

    let (status, json) = post_order(t.app, place_order_body("USD").to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["order"]["order_id"].is_string());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let t = setup();

    let (status, json) = post_order(t.app, r#"{"user_id": "user-1"}"#.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_wrong_field_type_is_bad_request() {
    let t = setup();
    let mut body = place_order_body("USD");
    body["user_currency"] = json!(42);

    let (status, _) = post_order(t.app, body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_lookup_known_shop() {
    let t = setup();
    let (status, body) = get(t.app, "/product/ACME:LAMP").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "Success");
    assert_eq!(json["data"]["result"], "ACME");
}

#[tokio::test]
async fn test_product_lookup_unknown_shop() {
    let t = setup();
    let (status, body) = get(t.app, "/product/GLBX:1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "Failed");
}

#[tokio::test]
async fn test_product_lookup_malformed_id() {
    let t = setup();
    let (status, _) = get(t.app, "/product/no-separator").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = setup();
    t.services.cart.add_item("user-1", CartItem::new("ONBQ:6E92ZMYYFZ", 1));
    let (status, _) = post_order(t.app.clone(), place_order_body("USD").to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(t.app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("checkout_orders_total"));
}
