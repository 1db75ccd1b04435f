//! HTTP client for the store API.
//!
//! A thin, uniform translation layer: one method per endpoint, JSON in and
//! out, and every failure folded into a single [`ApiError`] whose `Display`
//! is the message shown to the user. No retries, no backoff, no caching.
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/products?q=` | |
//! | POST | `/login` | `{email, password}` |
//! | POST | `/register` | `{email, name, password}` |
//! | GET | `/cart?email=` | |
//! | POST | `/cart/add` | `{email, productId}` |
//! | POST | `/cart/update` | `{email, productId, quantity}` |
//! | DELETE | `/cart/{email}/{productId}` | |
//! | DELETE | `/cart/{email}` | |
//! | GET | `/orders?email=` | |
//! | POST | `/orders` | `{email}` |

mod types;

pub use types::PlacedOrder;

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use ai_store_core::{CartLine, Email, Identity, Order, Product, ProductId};

use crate::config::normalize_base_url;
use types::{
    Ack, CartAddRequest, CartUpdateRequest, LoginRequest, PlaceOrderRequest, RegisterRequest,
};

/// Errors that can occur when talking to the store API.
///
/// `Display` yields the human-readable message, so callers can surface
/// `err.to_string()` directly.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base address could not be parsed.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The server answered 2xx but the body was not what the endpoint promises.
    #[error("Invalid response from {path}: {reason}")]
    Decode { path: String, reason: String },

    /// A mutation was acknowledged with `success: false`.
    #[error("Request failed: {path}")]
    Rejected { path: String },
}

impl ApiError {
    /// HTTP status for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the store API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client for the given base address.
    ///
    /// # Errors
    ///
    /// Returns an error if the base address is not an absolute URL or the
    /// HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// The normalized base address.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Join the base address with an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.inner.base_url)
        } else {
            format!("{}/{path}", self.inner.base_url)
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products, optionally filtered by a search query.
    ///
    /// An empty query lists everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let path = if query.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?q={}", urlencoding::encode(query))
        };
        self.get(&path).await
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials, the request
    /// fails, or the returned user record is incomplete.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity, ApiError> {
        let path = "/login";
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let raw: serde_json::Value = self.post(path, &body).await?;
        identity_from(path, &raw)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the registration (typically a
    /// duplicate email), the request fails, or the returned user record is
    /// incomplete.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &SecretString,
    ) -> Result<Identity, ApiError> {
        let path = "/register";
        let body = RegisterRequest {
            email,
            name,
            password: password.expose_secret(),
        };
        let raw: serde_json::Value = self.post(path, &body).await?;
        identity_from(path, &raw)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the full cart for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn fetch_cart(&self, email: &Email) -> Result<Vec<CartLine>, ApiError> {
        self.get(&format!("/cart?email={}", urlencoding::encode(email.as_str())))
            .await
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(email = %email, product_id = %product_id))]
    pub async fn add_to_cart(&self, email: &Email, product_id: &ProductId) -> Result<(), ApiError> {
        let path = "/cart/add";
        let ack: Ack = self
            .post(path, &CartAddRequest { email, product_id })
            .await?;
        check_ack(path, ack)
    }

    /// Set the quantity of a cart line.
    ///
    /// The quantity is passed through as-is; what zero or negative values mean
    /// is up to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(email = %email, product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        email: &Email,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), ApiError> {
        let path = "/cart/update";
        let ack: Ack = self
            .post(
                path,
                &CartUpdateRequest {
                    email,
                    product_id,
                    quantity,
                },
            )
            .await?;
        check_ack(path, ack)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(email = %email, product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        email: &Email,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/cart/{}/{}",
            urlencoding::encode(email.as_str()),
            urlencoding::encode(product_id.as_str())
        );
        let ack: Ack = self.delete(&path).await?;
        check_ack(&path, ack)
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn clear_cart(&self, email: &Email) -> Result<(), ApiError> {
        let path = format!("/cart/{}", urlencoding::encode(email.as_str()));
        let ack: Ack = self.delete(&path).await?;
        check_ack(&path, ack)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch the order history for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn fetch_orders(&self, email: &Email) -> Result<Vec<Order>, ApiError> {
        self.get(&format!("/orders?email={}", urlencoding::encode(email.as_str())))
            .await
    }

    /// Turn the current cart into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn place_order(&self, email: &Email) -> Result<PlacedOrder, ApiError> {
        let path = "/orders";
        let placed: PlacedOrder = self.post(path, &PlaceOrderRequest { email }).await?;
        if placed.success == Some(false) {
            return Err(ApiError::Rejected {
                path: path.to_string(),
            });
        }
        Ok(placed)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.endpoint(path));
        self.execute(path, request).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.client.post(self.endpoint(path)).json(body);
        self.execute(path, request).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.client.delete(self.endpoint(path));
        self.execute(path, request).await
    }

    /// Send a request and decode a JSON success body.
    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &content_type, &body);
            tracing::debug!(
                status = %status,
                path,
                message = %message,
                "store API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse store API response"
            );
            ApiError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// Extract the user-facing message from a failed response.
///
/// JSON bodies contribute their `error` or `message` field; other bodies
/// contribute their raw text. Anything else falls back to a generic message
/// carrying the status code.
fn error_message(status: StatusCode, content_type: &str, body: &str) -> String {
    let from_body = if content_type.contains("application/json") {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|data| {
                ["error", "message"].into_iter().find_map(|field| {
                    data.get(field)
                        .and_then(serde_json::Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            })
    } else {
        Some(body.to_string()).filter(|text| !text.is_empty())
    };

    from_body.unwrap_or_else(|| format!("Request failed: {}", status.as_u16()))
}

fn identity_from(path: &str, raw: &serde_json::Value) -> Result<Identity, ApiError> {
    Identity::sanitize(raw).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn check_ack(path: &str, ack: Ack) -> Result<(), ApiError> {
    if ack.is_rejected() {
        return Err(ApiError::Rejected {
            path: path.to_string(),
        });
    }
    Ok(())
}
