//! Core types for AI Store.
//!
//! This module provides type-safe wrappers for the storefront's domain
//! concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod identity;
pub mod price;
pub mod status;
pub mod ui_config;

pub use catalog::{CartLine, CartSummary, Order, Product};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Identity, IdentityError};
pub use price::Price;
pub use status::OrderStatus;
pub use ui_config::UiVariationConfig;
