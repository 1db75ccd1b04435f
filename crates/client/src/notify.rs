//! User-facing failure notifications.
//!
//! Store operations that fail in a way the user should know about (login,
//! registration, refresh, checkout) report through a [`Notifier`] instead of
//! returning an error. The presentation layer decides how to show them.

use std::fmt::Display;

#[cfg(any(test, feature = "test-support"))]
use parking_lot::Mutex;

/// Alert titles and fallback messages for each user-facing failure.
pub mod messages {
    pub const LOGIN_FAILED: &str = "Login failed";
    pub const LOGIN_FALLBACK: &str = "Incorrect email or password.";
    pub const REGISTER_FAILED: &str = "Sign-up failed";
    pub const REGISTER_FALLBACK: &str = "That email is already registered or an error occurred.";
    pub const REFRESH_FAILED: &str = "Couldn't load data";
    pub const REFRESH_FALLBACK: &str = "Check your connection to the server.";
    pub const CHECKOUT_FAILED: &str = "Order failed";
    pub const CHECKOUT_FALLBACK: &str = "Couldn't place the order.";
}

/// A blocking alert shown to the user.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Side channel for user-facing failure messages.
pub trait Notifier: Send + Sync {
    /// Show an alert.
    fn alert(&self, title: &str, message: &str);
}

/// Message for a failure, falling back when the error renders empty.
pub fn failure_message(err: &impl Display, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Writes alerts to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "user alert");
    }
}

/// Keeps every alert in memory.
///
/// Only built for tests and with the `test-support` feature.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All alerts shown so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    /// The most recent alert.
    #[must_use]
    pub fn last(&self) -> Option<Alert> {
        self.alerts.lock().last().cloned()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Notifier for RecordingNotifier {
    fn alert(&self, title: &str, message: &str) {
        self.alerts.lock().push(Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
