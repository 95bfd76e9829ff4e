//! Checkout coordinator: the PlaceOrder saga.

use std::future::Future;
use std::sync::Arc;

use common::{ContextError, OrderId, RequestContext};
use domain::{CartItem, Money, MoneyError, OrderItem, OrderResult, OriginResolver, PlaceOrderRequest, ProductOrigin};
use serde::Serialize;

use crate::error::CheckoutError;
use crate::marketplace::MarketplaceBridge;
use crate::services::{
    CartService, CatalogService, CurrencyService, EmailService, PaymentService, ShippingService,
};
use crate::state::{CheckoutProgress, CheckoutState};
use crate::steps;

/// Handles to every downstream dependency of a checkout.
///
/// The handles are shared by all concurrent checkouts and only used through
/// `&self` methods.
#[derive(Clone)]
pub struct Collaborators {
    pub cart: Arc<dyn CartService>,
    pub catalog: Arc<dyn CatalogService>,
    pub currency: Arc<dyn CurrencyService>,
    pub shipping: Arc<dyn ShippingService>,
    pub payment: Arc<dyn PaymentService>,
    pub email: Arc<dyn EmailService>,
    pub marketplace: Arc<dyn MarketplaceBridge>,
}

/// Result of a successful PlaceOrder call.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderResponse {
    pub order: OrderResult,

    /// States visited by the run, `Start` through `Done`.
    #[serde(skip)]
    pub states: Vec<CheckoutState>,
}

/// Lines priced in the buyer's currency.
struct PricedCart {
    items: Vec<OrderItem>,
    is_external: bool,
}

/// Orchestrates PlaceOrder across the downstream services.
///
/// Steps run strictly in sequence: cart, pricing, shipping quote, payment,
/// dispatch, then the best-effort cart clearing, confirmation email and
/// marketplace relay. A failure before the charge aborts the order with
/// nothing charged. Nothing that happens after the charge reverses it.
pub struct CheckoutCoordinator {
    services: Collaborators,
    resolver: OriginResolver,
}

impl CheckoutCoordinator {
    /// Creates a new checkout coordinator.
    pub fn new(services: Collaborators, resolver: OriginResolver) -> Self {
        Self { services, resolver }
    }

    /// The resolver used to tell internal and external products apart.
    pub fn resolver(&self) -> &OriginResolver {
        &self.resolver
    }

    /// Places an order for the cart owned by `req.user_id`.
    ///
    /// Every downstream call is bound to `ctx`; cancelling it or letting its
    /// deadline pass fails whichever step is in flight.
    #[tracing::instrument(
        skip(self, ctx, req),
        fields(user_id = %req.user_id, user_currency = %req.user_currency)
    )]
    pub async fn place_order(
        &self,
        ctx: &RequestContext,
        req: &PlaceOrderRequest,
    ) -> Result<PlaceOrderResponse, CheckoutError> {
        metrics::counter!("checkout_orders_total").increment(1);
        let started = std::time::Instant::now();
        let mut progress = CheckoutProgress::new();

        let result = self.run(ctx, req, &mut progress).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);

        match result {
            Ok(order) => {
                metrics::counter!("checkout_orders_completed").increment(1);
                tracing::info!(order_id = %order.order_id, duration, "order placed");
                Ok(PlaceOrderResponse {
                    order,
                    states: progress.into_trail(),
                })
            }
            Err(err) => {
                let aborted = err.aborted_state();
                progress.advance(aborted);
                metrics::counter!("checkout_orders_failed", "state" => aborted.as_str())
                    .increment(1);
                tracing::warn!(state = %aborted, code = %err.code(), error = %err, "order aborted");
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        req: &PlaceOrderRequest,
        progress: &mut CheckoutProgress,
    ) -> Result<OrderResult, CheckoutError> {
        let order_id = OrderId::new();
        tracing::info!(%order_id, "placing order");

        // 1. Cart
        tracing::info!(step = steps::STEP_FETCH_CART, "checkout step started");
        let cart_items = bounded(ctx, self.services.cart.get_cart(ctx, &req.user_id))
            .await
            .map_err(CheckoutError::CartFetch)?;
        progress.advance(CheckoutState::CartFetched);

        // 2. Pricing
        tracing::info!(step = steps::STEP_PRICE_ITEMS, lines = cart_items.len(), "checkout step started");
        let priced = self.price_items(ctx, &cart_items, &req.user_currency).await?;
        progress.advance(CheckoutState::Priced);

        // 3. Shipping quote, localized
        tracing::info!(step = steps::STEP_QUOTE_SHIPPING, "checkout step started");
        let shipping_usd = bounded(
            ctx,
            self.services.shipping.get_quote(ctx, &req.address, &cart_items),
        )
        .await
        .map_err(CheckoutError::ShippingQuote)?;
        progress.advance(CheckoutState::Quoted);

        let shipping_cost = bounded(
            ctx,
            self.services.currency.convert(ctx, &shipping_usd, &req.user_currency),
        )
        .await
        .map_err(CheckoutError::ShippingQuote)?;
        progress.advance(CheckoutState::Converted);

        // 4. Payment
        let total = order_total(&req.user_currency, &shipping_cost, &priced.items)?;
        tracing::info!(step = steps::STEP_CHARGE, %total, card = %req.credit_card.last_four(), "checkout step started");
        let transaction_id = bounded(
            ctx,
            self.services.payment.charge(ctx, &total, &req.credit_card),
        )
        .await
        .map_err(CheckoutError::Payment)?;
        progress.advance(CheckoutState::Charged);
        tracing::info!(%transaction_id, "payment went through");

        // 5. Fulfillment
        tracing::info!(step = steps::STEP_SHIP_ORDER, "checkout step started");
        let shipping_tracking_id = bounded(
            ctx,
            self.services.shipping.ship_order(ctx, &req.address, &cart_items),
        )
        .await
        .map_err(CheckoutError::ShippingDispatch)?;
        progress.advance(CheckoutState::Shipped);

        match bounded(ctx, self.services.cart.empty_cart(ctx, &req.user_id)).await {
            Ok(()) => progress.advance(CheckoutState::CartCleared),
            Err(err) => {
                best_effort_failed(steps::STEP_EMPTY_CART, &err);
                progress.advance(CheckoutState::CartClearFailed);
            }
        }

        let order = OrderResult {
            order_id,
            shipping_tracking_id,
            shipping_cost,
            shipping_address: req.address.clone(),
            items: priced.items,
        };

        // 6. Notification
        match bounded(
            ctx,
            self.services.email.send_order_confirmation(ctx, &req.email, &order),
        )
        .await
        {
            Ok(()) => {
                tracing::info!(email = %req.email, "order confirmation email sent");
                progress.advance(CheckoutState::Notified);
            }
            Err(err) => {
                best_effort_failed(steps::STEP_SEND_CONFIRMATION, &err);
                progress.advance(CheckoutState::NotifyFailed);
            }
        }

        // 7. Marketplace relay
        if priced.is_external {
            if let Err(err) = bounded(ctx, self.services.marketplace.relay(ctx, &order)).await {
                best_effort_failed(steps::STEP_RELAY_ORDER, &err);
            }
            progress.advance(CheckoutState::Relayed);
        } else {
            progress.advance(CheckoutState::RelaySkipped);
        }

        progress.advance(CheckoutState::Done);
        Ok(order)
    }

    /// Prices every cart line, in cart order, in `user_currency`.
    ///
    /// External lines must be confirmed by the marketplace first. Every line,
    /// external or not, is priced from the internal catalog.
    async fn price_items(
        &self,
        ctx: &RequestContext,
        cart_items: &[CartItem],
        user_currency: &str,
    ) -> Result<PricedCart, CheckoutError> {
        let mut items = Vec::with_capacity(cart_items.len());
        let mut is_external = false;

        for item in cart_items {
            let product_id = &item.product_id;
            item.validate()?;

            if let ProductOrigin::External { store_id } = self.resolver.resolve(product_id)? {
                is_external = true;
                tracing::debug!(%product_id, %store_id, "checking external listing");

                match bounded(ctx, self.services.marketplace.exists(ctx, product_id)).await {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(CheckoutError::ExternalProductUnavailable {
                            product_id: product_id.clone(),
                            reason: format!("not listed by store {store_id}"),
                        });
                    }
                    Err(err) => {
                        return Err(CheckoutError::ExternalProductUnavailable {
                            product_id: product_id.clone(),
                            reason: err.to_string(),
                        });
                    }
                }
            }

            let product = bounded(ctx, self.services.catalog.get_product(ctx, product_id))
                .await
                .map_err(|source| CheckoutError::Pricing {
                    product_id: product_id.clone(),
                    source,
                })?;
            let cost = bounded(
                ctx,
                self.services.currency.convert(ctx, &product.price_usd, user_currency),
            )
            .await
            .map_err(|source| CheckoutError::Pricing {
                product_id: product_id.clone(),
                source,
            })?;

            items.push(OrderItem::new(item.clone(), cost));
        }

        Ok(PricedCart { items, is_external })
    }
}

/// Grand total: shipping plus every line's cost times quantity, summed left
/// to right in cart order starting from zero in `currency`.
pub fn order_total(currency: &str, shipping_cost: &Money, items: &[OrderItem]) -> Result<Money, MoneyError> {
    let mut total = Money::zero(currency).sum(shipping_cost)?;
    for item in items {
        total = total.sum(&item.line_total()?)?;
    }
    Ok(total)
}

/// Runs a downstream call under the request context.
async fn bounded<T, E, F>(ctx: &RequestContext, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<ContextError>,
{
    match ctx.run(call).await {
        Ok(result) => result,
        Err(err) => Err(E::from(err)),
    }
}

fn best_effort_failed(step: &'static str, err: &dyn std::error::Error) {
    metrics::counter!("checkout_best_effort_failures", "step" => step).increment(1);
    tracing::warn!(step, error = %err, "best-effort checkout step failed");
}
