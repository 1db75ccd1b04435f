//! Order status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Fulfillment status of a placed order, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Wire value of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }

    /// Human-readable label for order history listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "Preparing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
