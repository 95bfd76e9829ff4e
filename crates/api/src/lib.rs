//! HTTP front end for the checkout.
//!
//! Serves PlaceOrder over JSON, health and Prometheus endpoints, and a small
//! marketplace listing lookup, with structured logging (tracing) and
//! metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod shops;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CheckoutCoordinator, Collaborators, HttpMarketplaceBridge, InMemoryCartService,
    InMemoryCatalogService, InMemoryCurrencyService, InMemoryEmailService, InMemoryPaymentService,
    InMemoryShippingService, MarketplaceBridge,
};
use domain::{Money, MoneyError, OriginResolver};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::StartupError;
use routes::orders::AppState;
use shops::ShopDirectory;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/health/watch", get(routes::health::watch))
        .route("/orders", post(routes::orders::place_order))
        .route("/product/{id}", get(routes::marketplace::product))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// In-process stand-ins for the six downstream services.
///
/// Handles are cheap clones sharing state, so callers can seed carts or
/// inject failures after the application is built.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServices {
    pub cart: InMemoryCartService,
    pub catalog: InMemoryCatalogService,
    pub currency: InMemoryCurrencyService,
    pub shipping: InMemoryShippingService,
    pub payment: InMemoryPaymentService,
    pub email: InMemoryEmailService,
}

impl InMemoryServices {
    /// Services with a small catalog under `internal_store_id`, a flat
    /// shipping quote and a handful of exchange rates.
    ///
    /// Fails if a listed price is not a valid amount.
    pub fn with_demo_catalog(internal_store_id: &str) -> Result<Self, MoneyError> {
        let services = Self {
            shipping: InMemoryShippingService::with_quote(Money::new("USD", 8, 990_000_000)?),
            ..Self::default()
        };

        // (local id, name, units, nanos) in USD
        let catalog = [
            ("OLJCESPC7Z", "Sunglasses", 19, 990_000_000),
            ("66VCHSJNUP", "Tank Top", 18, 990_000_000),
            ("1YMWWN1N4O", "Watch", 109, 990_000_000),
            ("L9ECAV7KIM", "Loafers", 89, 990_000_000),
            ("2ZYFJ3GM2N", "Hairdryer", 24, 990_000_000),
            ("0PUK6V6EV0", "Candle Holder", 18, 990_000_000),
            ("LS4PSXUNUM", "Salt & Pepper Shakers", 18, 490_000_000),
            ("9SIQT8TOJO", "Bamboo Glass Jar", 5, 490_000_000),
            ("6E92ZMYYFZ", "Mug", 8, 990_000_000),
        ];
        for (local_id, name, units, nanos) in catalog {
            services.catalog.add_product(
                format!("{internal_store_id}:{local_id}"),
                name,
                Money::new("USD", units, nanos)?,
            );
        }

        // Nanos of each currency per USD
        for (code, rate) in [
            ("EUR", 920_000_000),
            ("GBP", 790_000_000),
            ("CAD", 1_360_000_000),
            ("JPY", 149_500_000_000),
        ] {
            services.currency.set_rate(code, rate);
        }

        Ok(services)
    }

    /// Bundles the services with `marketplace` for the coordinator.
    pub fn collaborators(&self, marketplace: Arc<dyn MarketplaceBridge>) -> Collaborators {
        Collaborators {
            cart: Arc::new(self.cart.clone()),
            catalog: Arc::new(self.catalog.clone()),
            currency: Arc::new(self.currency.clone()),
            shipping: Arc::new(self.shipping.clone()),
            payment: Arc::new(self.payment.clone()),
            email: Arc::new(self.email.clone()),
            marketplace,
        }
    }
}

/// Builds application state from explicit parts.
pub fn create_state(
    config: &Config,
    services: &InMemoryServices,
    marketplace: Arc<dyn MarketplaceBridge>,
    shops: ShopDirectory,
) -> Arc<AppState> {
    let resolver = OriginResolver::new(config.internal_store_id.clone());
    let coordinator = CheckoutCoordinator::new(services.collaborators(marketplace), resolver);

    Arc::new(AppState {
        coordinator,
        shops,
        request_timeout: config.request_timeout,
    })
}

/// Creates the default application state: in-memory services, the HTTP
/// marketplace bridge at `config.marketplace_url` and the configured shop
/// directory.
pub fn create_default_state(config: &Config) -> Result<(Arc<AppState>, InMemoryServices), StartupError> {
    let services = InMemoryServices::with_demo_catalog(&config.internal_store_id)?;

    let resolver = OriginResolver::new(config.internal_store_id.clone());
    let marketplace = HttpMarketplaceBridge::new(config.marketplace_url.clone(), resolver)?;

    let shops = match &config.shops_file {
        Some(path) => ShopDirectory::load(path)?,
        None => ShopDirectory::default(),
    };
    tracing::info!(shops = shops.len(), marketplace = %config.marketplace_url, "application state ready");

    let state = create_state(config, &services, Arc::new(marketplace), shops);
    Ok((state, services))
}
