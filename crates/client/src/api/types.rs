//! Request and response bodies for the store API.
//!
//! Catalog, cart and order payloads deserialize straight into the
//! `ai_store_core` types; only the envelopes live here.

use serde::{Deserialize, Serialize};

use ai_store_core::{Email, OrderId, ProductId};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartAddRequest<'a> {
    pub email: &'a Email,
    pub product_id: &'a ProductId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartUpdateRequest<'a> {
    pub email: &'a Email,
    pub product_id: &'a ProductId,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaceOrderRequest<'a> {
    pub email: &'a Email,
}

/// Acknowledgement returned by cart mutations.
///
/// A missing `success` field counts as success; only an explicit `false` is
/// treated as a rejection.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
}

impl Ack {
    pub(crate) const fn is_rejected(self) -> bool {
        matches!(self.success, Some(false))
    }
}

/// Response to a successful order placement.
///
/// The order exists once the server answers 2xx, so a missing `orderId`
/// is tolerated rather than treated as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}
