//! HTTP client for the external marketplace.

use std::time::Duration;

use async_trait::async_trait;
use common::RequestContext;
use domain::{OrderResult, OriginResolver, ProductId};
use reqwest::{Client, Url};

use super::{ExistenceEnvelope, ExternalOrder, MarketplaceBridge};
use crate::error::BridgeError;

/// Upper bound for a single marketplace call when the request has no deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Marketplace bridge over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpMarketplaceBridge {
    client: Client,
    base_url: String,
    resolver: OriginResolver,
}

impl HttpMarketplaceBridge {
    /// Creates a bridge for the marketplace at `base_url`.
    pub fn new(base_url: impl Into<String>, resolver: OriginResolver) -> Result<Self, BridgeError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, resolver))
    }

    /// Creates a bridge reusing an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>, resolver: OriginResolver) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            resolver,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `{base}/product/{id}` with the id escaped as a single path segment.
    fn product_url(&self, product_id: &ProductId) -> Result<Url, BridgeError> {
        let invalid = || BridgeError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.url("/product")).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .push(product_id.as_str());
        Ok(url)
    }

    fn bounded(&self, ctx: &RequestContext, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match ctx.remaining() {
            Some(remaining) => request.timeout(remaining),
            None => request,
        }
    }
}

#[async_trait]
impl MarketplaceBridge for HttpMarketplaceBridge {
    async fn exists(&self, ctx: &RequestContext, product_id: &ProductId) -> Result<bool, BridgeError> {
        let url = self.product_url(product_id)?;
        tracing::debug!(%url, "checking marketplace listing");

        let request = self.bounded(ctx, self.client.get(url));
        let response = ctx.run(request.send()).await??;
        let body = ctx.run(response.bytes()).await??;

        // The envelope is authoritative whatever the HTTP status.
        let envelope: ExistenceEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.is_success())
    }

    async fn relay(&self, ctx: &RequestContext, order: &OrderResult) -> Result<(), BridgeError> {
        let payload = ExternalOrder::from_order(order, &self.resolver);
        let url = self.url("/order");
        tracing::debug!(%url, order_id = %payload.order_id, items = payload.items.len(), "relaying order");

        let request = self.bounded(ctx, self.client.post(&url).json(&payload));
        let response = ctx.run(request.send()).await??;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Status(status.as_u16()));
        }

        tracing::info!(order_id = %payload.order_id, status = status.as_u16(), "marketplace accepted order");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let bridge = HttpMarketplaceBridge::with_client(
            Client::new(),
            "http://marketplace.local:9090/",
            OriginResolver::default(),
        );
        assert_eq!(bridge.url("/order"), "http://marketplace.local:9090/order");
        assert_eq!(bridge.base_url(), "http://marketplace.local:9090/");
    }

    #[test]
    fn test_product_url_escapes_id() {
        let bridge = HttpMarketplaceBridge::with_client(
            Client::new(),
            "http://marketplace.local:9090/",
            OriginResolver::default(),
        );

        let url = bridge.product_url(&ProductId::new("ACME:LAMP")).unwrap();
        assert_eq!(url.as_str(), "http://marketplace.local:9090/product/ACME:LAMP");

        let url = bridge.product_url(&ProductId::new("ACME:a/b?c#d")).unwrap();
        assert_eq!(url.path(), "/product/ACME:a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_unparseable_base_url() {
        let bridge = HttpMarketplaceBridge::with_client(Client::new(), "not a url", OriginResolver::default());
        assert!(matches!(
            bridge.product_url(&ProductId::new("ACME:LAMP")),
            Err(BridgeError::InvalidUrl(_))
        ));
    }
}
