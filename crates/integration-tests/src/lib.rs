//! Integration tests for the AI Store client.
//!
//! Every test runs the real client stack (API client, session store, catalog
//! store) against a `wiremock` server standing in for the store API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ai-store-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Login, registration, logout and restore
//! - `cart_sync` - Catalog refresh, cart mutations and resync
//! - `checkout` - Order placement and conversion tracking
//! - `stale_responses` - Responses that land after the identity changed

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_store_client::experiment::{EventSink, TrackingError, TrackingEvent};
use ai_store_client::session::CURRENT_USER_KEY;
use ai_store_client::{
    ApiClient, CatalogStore, MemoryStorage, RecordingNotifier, SessionStore, UiConfigStore,
};

/// Password used by every mocked account.
pub const PASSWORD: &str = "hunter2";

/// A fully wired client pointed at a mock server.
pub struct TestContext {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub events: Arc<RecordingEventSink>,
    pub session: SessionStore,
    pub store: CatalogStore,
}

impl TestContext {
    /// Start a mock server and a logged-out client.
    pub async fn new() -> Self {
        Self::build(MemoryStorage::new(), RecordingEventSink::default()).await
    }

    /// Start with `raw` stored as the persisted identity, then restore it.
    pub async fn with_stored_user(raw: &str) -> Self {
        Self::build(
            MemoryStorage::with_entry(CURRENT_USER_KEY, raw),
            RecordingEventSink::default(),
        )
        .await
    }

    /// Like [`with_stored_user`](Self::with_stored_user), with every tracked
    /// event failing delivery.
    pub async fn with_failing_tracking(raw: &str) -> Self {
        Self::build(
            MemoryStorage::with_entry(CURRENT_USER_KEY, raw),
            RecordingEventSink::failing(),
        )
        .await
    }

    async fn build(storage: MemoryStorage, events: RecordingEventSink) -> Self {
        let server = MockServer::start().await;
        let api = ApiClient::new(&server.uri()).expect("mock server URI is valid");
        let storage = Arc::new(storage);
        let notifier = Arc::new(RecordingNotifier::new());
        let events = Arc::new(events);

        let session = SessionStore::new(
            api.clone(),
            storage.clone(),
            notifier.clone(),
            UiConfigStore::new(),
        );
        session.restore().await;
        let store = CatalogStore::new(api, session.clone(), notifier.clone(), events.clone());

        Self {
            server,
            storage,
            notifier,
            events,
            session,
            store,
        }
    }

    /// Accept `email` / [`PASSWORD`] and answer with `user`.
    pub async fn mount_login(&self, email: &str, user: Value) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_partial_json(json!({"email": email, "password": PASSWORD})))
            .respond_with(ResponseTemplate::new(200).set_body_json(user))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_products(&self, products: Value) {
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_cart(&self, email: &str, lines: Value) {
        self.mount_cart_delayed(email, lines, Duration::ZERO).await;
    }

    /// Serve `email`'s cart after `delay`.
    pub async fn mount_cart_delayed(&self, email: &str, lines: Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/cart"))
            .and(query_param("email", email))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(lines)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_orders(&self, email: &str, orders: Value) {
        Mock::given(method("GET"))
            .and(path("/orders"))
            .and(query_param("email", email))
            .respond_with(ResponseTemplate::new(200).set_body_json(orders))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for `method_name` and `route`.
    pub async fn requests(&self, method_name: &str, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == method_name && r.url.path() == route)
            .count()
    }

    /// Total number of requests received.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .len()
    }
}

/// Records every tracked event, optionally failing each delivery.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<TrackingEvent>>,
    fail: bool,
}

impl RecordingEventSink {
    /// A sink that records events and then reports them undeliverable.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn track(&self, event: TrackingEvent) -> Result<(), TrackingError> {
        self.events.lock().push(event);
        if self.fail {
            Err(TrackingError::Delivery("collector unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

#[must_use]
pub fn user(email: &str, name: &str) -> Value {
    json!({"email": email, "name": name})
}

#[must_use]
pub fn product(id: &str, category: &str, price: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "description": "",
        "category": category,
        "price": price
    })
}

#[must_use]
pub fn cart_line(id: &str, price: i64, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "category": "Books",
        "price": price,
        "quantity": quantity
    })
}

#[must_use]
pub fn order(id: &str, total: i64, status: &str) -> Value {
    json!({
        "id": id,
        "date": "2024-05-01T09:30:00Z",
        "total": total,
        "status": status,
        "items": []
    })
}

/// Poll `condition` until it holds or about two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
