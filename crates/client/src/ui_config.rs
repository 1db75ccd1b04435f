//! Holder for the active UI variation.

use std::sync::Arc;

use parking_lot::RwLock;

use ai_store_core::UiVariationConfig;

/// Shared, swappable [`UiVariationConfig`].
///
/// The session store sets it when an identity carrying a variant signs in and
/// resets it to defaults on logout.
#[derive(Debug, Clone, Default)]
pub struct UiConfigStore {
    current: Arc<RwLock<UiVariationConfig>>,
}

impl UiConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active configuration.
    #[must_use]
    pub fn current(&self) -> UiVariationConfig {
        self.current.read().clone()
    }

    pub fn set(&self, config: UiVariationConfig) {
        *self.current.write() = config;
    }

    pub fn reset(&self) {
        self.set(UiVariationConfig::default());
    }
}
