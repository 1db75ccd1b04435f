//! AI Store Core - Shared types library.
//!
//! This crate provides the domain types used across all AI Store components:
//! - `client` - Session, catalog and cart synchronization against the store API
//! - `cli` - Command-line front-end that drives the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identity, catalog, cart, order and UI variation types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
