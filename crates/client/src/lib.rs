//! AI Store Client - session, catalog and cart synchronization.
//!
//! This crate is the state layer of the AI Store front-end. It talks to the
//! store's JSON API and keeps a local mirror of:
//!
//! - the authenticated identity ([`session::SessionStore`])
//! - the product catalog, cart and order history ([`store::CatalogStore`])
//! - the active UI variation ([`ui_config::UiConfigStore`])
//!
//! The server is authoritative for everything except the session. Cart and
//! order state is only ever replaced wholesale by what the server returns.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the store API
//! - [`config`] - Configuration from environment variables
//! - [`experiment`] - Boundary to the feature-flag and event-tracking service
//! - [`notify`] - User-facing failure alerts
//! - [`session`] - Identity lifecycle and persistence
//! - [`storage`] - Key-value persistence for the session record
//! - [`store`] - Catalog, cart and order synchronization
//! - [`ui_config`] - Active UI variation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod experiment;
pub mod notify;
pub mod session;
pub mod storage;
pub mod store;
pub mod ui_config;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError, Platform};
pub use notify::{Notifier, TracingNotifier};
#[cfg(any(test, feature = "test-support"))]
pub use notify::RecordingNotifier;
pub use session::{SessionSnapshot, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::CatalogStore;
pub use ui_config::UiConfigStore;
