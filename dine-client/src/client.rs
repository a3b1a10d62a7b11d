//! Dine client facade
//!
//! Bundles configuration, the typed API and the session registry so callers
//! drive the ordering flow through one value.

use crate::api::OrderApi;
use crate::cart::LineId;
use crate::catalog::Catalog;
use crate::error::CartError;
use crate::history::{OrderHistory, load_orders};
use crate::http::{HttpClient, NetworkHttpClient};
use crate::money::{PriceBreakdown, to_decimal};
use crate::session::{SessionContext, SessionRegistry};
use crate::stock::{StockShortfall, find_shortfalls};
use crate::submit::submit_order;
use crate::{ClientConfig, ClientResult, DineError, DineResult};
use shared::models::{ItemRef, Order};
use std::sync::Arc;

/// Ordering client over a transport `C`
#[derive(Debug)]
pub struct DineClient<C> {
    config: ClientConfig,
    api: OrderApi<C>,
    sessions: SessionRegistry,
}

impl DineClient<NetworkHttpClient> {
    /// Client talking to `config.base_url` over the network
    pub fn connect(config: ClientConfig) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(&config)?;
        Ok(Self::with_transport(config, http))
    }
}

impl<C: HttpClient> DineClient<C> {
    pub fn with_transport(config: ClientConfig, http: C) -> Self {
        let sessions = match &config.session_dir {
            Some(dir) => SessionRegistry::with_storage_dir(dir.clone()),
            None => SessionRegistry::new(),
        };
        Self {
            config,
            api: OrderApi::new(http),
            sessions,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &OrderApi<C> {
        &self.api
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Create (or reuse) the context of a browsing session
    pub fn open_session(&self, session_id: &str) -> Arc<SessionContext> {
        self.sessions.create(session_id)
    }

    /// End a browsing session, dropping its caches and cart
    pub fn end_session(&self, session_id: &str) -> bool {
        self.sessions.invalidate(session_id)
    }

    pub async fn resolve_table(&self, ctx: &SessionContext, token: &str) -> DineResult<i64> {
        ctx.resolve_table(&self.api, token).await
    }

    /// Session catalog; an empty catalog plus the error when unavailable
    pub async fn load_catalog(&self, ctx: &SessionContext) -> (Arc<Catalog>, Option<DineError>) {
        ctx.catalog().load_or_empty(&self.api).await
    }

    /// Forced refetch of the session catalog
    pub async fn refresh_catalog(&self, ctx: &SessionContext) -> DineResult<Arc<Catalog>> {
        ctx.catalog().refresh(&self.api).await
    }

    /// Add `quantity` units of `item` against the session's current catalog
    pub fn add_to_cart(
        &self,
        ctx: &SessionContext,
        item: ItemRef,
        quantity: usize,
        request: Option<String>,
    ) -> Result<Vec<LineId>, CartError> {
        let catalog = ctx.catalog().current();
        ctx.cart().add_line(&catalog, item, quantity, request)
    }

    /// Cart total at current catalog prices
    pub fn cart_total(&self, ctx: &SessionContext) -> f64 {
        let catalog = ctx.catalog().current();
        ctx.cart().total_amount(&catalog)
    }

    /// Items that would block submission right now
    pub fn check_stock(&self, ctx: &SessionContext) -> Vec<StockShortfall> {
        let catalog = ctx.catalog().current();
        find_shortfalls(&ctx.cart(), &catalog)
    }

    pub async fn submit_order(&self, ctx: &SessionContext, token: &str) -> DineResult<Order> {
        submit_order(ctx, &self.api, token, self.config.submit_timeout()).await
    }

    pub async fn load_orders(&self, ctx: &SessionContext, token: &str) -> DineResult<OrderHistory> {
        load_orders(ctx, &self.api, token).await
    }

    /// Confirmation breakdown with the configured VAT
    pub fn breakdown(&self, subtotal: f64) -> PriceBreakdown {
        PriceBreakdown::new(to_decimal(subtotal), self.config.vat_percentage)
    }
}
