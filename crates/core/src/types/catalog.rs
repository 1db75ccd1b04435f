//! Catalog, cart and order types as served by the store API.
//!
//! All of these are read-only snapshots of server state. The client never
//! edits them in place; it replaces whole collections after re-fetching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};
use super::price::Price;
use super::status::OrderStatus;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One product-and-quantity entry in a cart.
///
/// The line ID is the product ID; the server guarantees at most one line per
/// product and a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub date: DateTime<Utc>,
    pub total: Price,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// Display totals derived from a cart snapshot.
///
/// Used for rendering and tracking only. Never feed these back into cart
/// mutations; the server owns quantities and prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Sum of all line quantities.
    pub item_count: u64,
    /// Sum of `price * quantity` over all lines.
    pub total: Price,
}

impl CartSummary {
    /// Summarize a cart.
    #[must_use]
    pub fn of(lines: &[CartLine]) -> Self {
        Self {
            item_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
            total: lines.iter().map(CartLine::line_total).sum(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(id: &str, price: i64, quantity: u32) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            name: format!("item {id}"),
            category: "Books".to_string(),
            price: Price::new(price),
            quantity,
            image_url: None,
        }
    }

    #[test]
    fn test_product_from_api_json() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Keyboard",
            "description": "Mechanical",
            "category": "Electronics",
            "price": 89000,
            "imageUrl": "https://img.example.com/p1.png"
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Price::new(89_000));
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://img.example.com/p1.png")
        );
    }

    #[test]
    fn test_product_without_image() {
        let product: Product = serde_json::from_value(json!({
            "id": "p2",
            "name": "Novel",
            "description": "",
            "category": "Books",
            "price": 12000
        }))
        .unwrap();
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_order_from_api_json() {
        let order: Order = serde_json::from_value(json!({
            "id": "o-1",
            "date": "2025-01-15T09:30:00.000Z",
            "total": 24000,
            "status": "processing",
            "items": [{
                "id": "p2", "name": "Novel", "category": "Books",
                "price": 12000, "quantity": 2
            }]
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, Price::new(24_000));
    }

    #[test]
    fn test_cart_summary() {
        let cart = vec![line("a", 1_000, 2), line("b", 250, 4)];
        let summary = CartSummary::of(&cart);
        assert_eq!(summary.item_count, 6);
        assert_eq!(summary.total, Price::new(3_000));
    }

    #[test]
    fn test_cart_summary_empty() {
        assert_eq!(CartSummary::of(&[]), CartSummary::default());
    }
}
