//! Catalog & fulfillment store: products, cart and order history.
//!
//! The server is the single source of truth. Every mutation is sent to the
//! API and followed by a full re-fetch of cart and orders ("resync"); the
//! store never applies deltas locally.
//!
//! # Identity scoping
//!
//! The collections belong to whichever identity the [`SessionStore`] holds.
//! [`CatalogStore::spawn_session_listener`] clears them when the session
//! logs out and refreshes them when a different account logs in.
//!
//! Each fetch records the session generation it was issued under and its
//! result is dropped if the generation has moved on by the time it lands, so
//! a slow response for a previous account can never overwrite the current
//! one's data.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ai_store_core::{CartLine, CartSummary, Identity, Order, Price, Product, ProductId};

use crate::api::{ApiClient, ApiError, PlacedOrder};
use crate::experiment::{CheckoutButton, EventSink, ExperimentUser, ORDER_PLACED_EVENT, TrackingEvent};
use crate::notify::{Notifier, failure_message, messages};
use crate::session::{SessionSnapshot, SessionStore};

#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<Product>,
    cart: Vec<CartLine>,
    orders: Vec<Order>,
    refreshes_in_flight: usize,
}

/// The catalog & fulfillment store.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,
    state: RwLock<CatalogState>,
}

/// Keeps the busy flag raised while alive.
struct RefreshGuard<'a> {
    store: &'a CatalogStore,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.store.inner.state.write();
        state.refreshes_in_flight = state.refreshes_in_flight.saturating_sub(1);
    }
}

impl CatalogStore {
    /// Create an empty store bound to `session`.
    #[must_use]
    pub fn new(
        api: ApiClient,
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                api,
                session,
                notifier,
                events,
                state: RwLock::new(CatalogState::default()),
            }),
        }
    }

    // =========================================================================
    // Read Accessors
    // =========================================================================

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.inner.state.read().products.clone()
    }

    /// Products in `category`, or every product when `None`.
    #[must_use]
    pub fn products_in_category(&self, category: Option<&str>) -> Vec<Product> {
        let state = self.inner.state.read();
        match category {
            Some(category) => state
                .products
                .iter()
                .filter(|p| p.category == category)
                .cloned()
                .collect(),
            None => state.products.clone(),
        }
    }

    #[must_use]
    pub fn cart(&self) -> Vec<CartLine> {
        self.inner.state.read().cart.clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.inner.state.read().orders.clone()
    }

    /// Whether a [`refresh_all`](Self::refresh_all) is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.state.read().refreshes_in_flight > 0
    }

    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        CartSummary::of(&self.inner.state.read().cart)
    }

    #[must_use]
    pub fn cart_item_count(&self) -> u64 {
        self.cart_summary().item_count
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart_summary().total
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Re-fetch everything from the server.
    ///
    /// Products are fetched for `query` (all products when `None` or empty).
    /// If someone is logged in, their cart and orders are fetched as well,
    /// concurrently. State is replaced in full only if every fetch succeeds;
    /// on failure an alert is shown and the previous state is kept.
    pub async fn refresh_all(&self, query: Option<&str>) {
        let _busy = self.begin_refresh();
        let issued = self.inner.session.snapshot();

        if let Err(err) = self.fetch_all(query.unwrap_or_default(), &issued).await {
            warn!(error = %err, "refresh failed");
            self.inner.notifier.alert(
                messages::REFRESH_FAILED,
                &failure_message(&err, messages::REFRESH_FALLBACK),
            );
        }
    }

    /// Reload the unfiltered catalog along with cart and orders.
    pub async fn reset_products(&self) {
        self.refresh_all(Some("")).await;
    }

    /// React to one identity change.
    ///
    /// Logging out clears every collection immediately. Logging in schedules a
    /// full refresh on the runtime and returns its handle.
    pub fn on_session_change(&self, snapshot: &SessionSnapshot) -> Option<JoinHandle<()>> {
        if snapshot.identity.is_none() {
            debug!(generation = snapshot.generation, "session ended, clearing store");
            let mut state = self.inner.state.write();
            state.products.clear();
            state.cart.clear();
            state.orders.clear();
            return None;
        }

        let store = self.clone();
        Some(tokio::spawn(async move { store.refresh_all(None).await }))
    }

    /// Follow the session for as long as it lives.
    ///
    /// The current identity is handled immediately, then every change is
    /// handled as it is published.
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let mut changes = self.inner.session.subscribe();
        let store = self.clone();

        tokio::spawn(async move {
            let initial = changes.borrow_and_update().clone();
            store.on_session_change(&initial);

            while changes.changed().await.is_ok() {
                let snapshot = changes.borrow_and_update().clone();
                store.on_session_change(&snapshot);
            }
        })
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Add one unit of `product` to the cart. No-op when logged out.
    ///
    /// # Errors
    ///
    /// Returns the API error if the mutation or the following resync fails.
    pub async fn add_item_to_cart(&self, product: &Product) -> Result<(), ApiError> {
        let Some(identity) = self.inner.session.current() else {
            return Ok(());
        };
        self.inner.api.add_to_cart(&identity.email, &product.id).await?;
        self.resync().await
    }

    /// Remove a cart line. No-op when logged out.
    ///
    /// # Errors
    ///
    /// Returns the API error if the mutation or the following resync fails.
    pub async fn remove_item_from_cart(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let Some(identity) = self.inner.session.current() else {
            return Ok(());
        };
        self.inner
            .api
            .remove_from_cart(&identity.email, product_id)
            .await?;
        self.resync().await
    }

    /// Adjust a line's quantity by `delta`.
    ///
    /// The target quantity is computed from the local line only to build the
    /// request; the line itself is left alone until the resync replaces it.
    /// No-op when logged out or when the line is not in the local cart.
    ///
    /// # Errors
    ///
    /// Returns the API error if the mutation or the following resync fails.
    pub async fn change_quantity(&self, product_id: &ProductId, delta: i64) -> Result<(), ApiError> {
        let Some(identity) = self.inner.session.current() else {
            return Ok(());
        };
        let current = {
            let state = self.inner.state.read();
            state
                .cart
                .iter()
                .find(|line| &line.id == product_id)
                .map(|line| line.quantity)
        };
        let Some(current) = current else {
            return Ok(());
        };

        let target = i64::from(current).saturating_add(delta);
        self.inner
            .api
            .update_cart_item(&identity.email, product_id, target)
            .await?;
        self.resync().await
    }

    /// Empty the cart. No-op when logged out.
    ///
    /// # Errors
    ///
    /// Returns the API error if the mutation or the following resync fails.
    pub async fn clear_all_cart(&self) -> Result<(), ApiError> {
        let Some(identity) = self.inner.session.current() else {
            return Ok(());
        };
        self.inner.api.clear_cart(&identity.email).await?;
        self.resync().await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place an order for the current cart.
    ///
    /// No-op (returns `None`) when logged out or the cart is empty. When
    /// `button` is given, an `order_placed` event carrying the button's
    /// experiment state is tracked first; tracking failures are ignored. If
    /// the order is not accepted an alert is shown and `None` returned.
    ///
    /// Once the server accepts the order, cart and orders are always
    /// resynced and the order is reported as placed, even if the resync
    /// itself fails.
    pub async fn checkout(&self, button: Option<&CheckoutButton>) -> Option<PlacedOrder> {
        let identity = self.inner.session.current()?;
        let summary = {
            let state = self.inner.state.read();
            if state.cart.is_empty() {
                return None;
            }
            CartSummary::of(&state.cart)
        };

        if let Some(button) = button {
            self.track_checkout(&identity, button, summary).await;
        }

        let placed = match self.inner.api.place_order(&identity.email).await {
            Ok(placed) => placed,
            Err(err) => {
                warn!(error = %err, "checkout failed");
                self.inner.notifier.alert(
                    messages::CHECKOUT_FAILED,
                    &failure_message(&err, messages::CHECKOUT_FALLBACK),
                );
                return None;
            }
        };

        if let Err(err) = self.resync().await {
            warn!(error = %err, "resync after checkout failed");
            self.inner.notifier.alert(
                messages::REFRESH_FAILED,
                &failure_message(&err, messages::REFRESH_FALLBACK),
            );
        }
        Some(placed)
    }

    async fn track_checkout(&self, identity: &Identity, button: &CheckoutButton, summary: CartSummary) {
        let mut tags = Map::new();
        tags.insert("buttonText".to_string(), Value::String(button.text.clone()));
        tags.insert(
            "variationKey".to_string(),
            button
                .variation_key
                .clone()
                .map_or(Value::Null, Value::String),
        );
        tags.insert("flagEnabled".to_string(), Value::Bool(button.flag_enabled));
        tags.insert("cartItemCount".to_string(), Value::from(summary.item_count));
        tags.insert("cartTotal".to_string(), Value::from(summary.total.amount()));

        let event = TrackingEvent {
            key: ORDER_PLACED_EVENT.to_string(),
            user: ExperimentUser::from_identity(Some(identity)),
            tags,
        };

        if let Err(e) = self.inner.events.track(event).await {
            warn!(error = %e, "ignoring checkout tracking failure");
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin_refresh(&self) -> RefreshGuard<'_> {
        self.inner.state.write().refreshes_in_flight += 1;
        RefreshGuard { store: self }
    }

    async fn fetch_all(&self, query: &str, issued: &SessionSnapshot) -> Result<(), ApiError> {
        let api = &self.inner.api;
        let products = api.fetch_products(query).await?;

        let (cart, orders) = match &issued.identity {
            Some(identity) => {
                tokio::try_join!(api.fetch_cart(&identity.email), api.fetch_orders(&identity.email))?
            }
            None => (Vec::new(), Vec::new()),
        };

        self.apply(issued.generation, |state| {
            state.products = products;
            state.cart = cart;
            state.orders = orders;
        });
        Ok(())
    }

    /// Re-fetch cart and orders for the current identity.
    async fn resync(&self) -> Result<(), ApiError> {
        let issued = self.inner.session.snapshot();
        let (cart, orders) = match &issued.identity {
            Some(identity) => {
                let api = &self.inner.api;
                tokio::try_join!(api.fetch_cart(&identity.email), api.fetch_orders(&identity.email))?
            }
            None => (Vec::new(), Vec::new()),
        };

        self.apply(issued.generation, |state| {
            state.cart = cart;
            state.orders = orders;
        });
        Ok(())
    }

    /// Write fetched data unless the session moved on since it was requested.
    fn apply(&self, generation: u64, write: impl FnOnce(&mut CatalogState)) -> bool {
        let mut state = self.inner.state.write();
        let current = self.inner.session.generation();
        if current != generation {
            debug!(issued = generation, current, "discarding stale response");
            return false;
        }
        write(&mut state);
        true
    }
}
