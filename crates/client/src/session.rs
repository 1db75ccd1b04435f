//! Session store: the current authenticated identity.
//!
//! Owns the in-memory [`Identity`] and its persisted copy, and publishes every
//! identity change on a `tokio::sync::watch` channel. Each change bumps a
//! generation counter so dependents can tell a response issued for an
//! earlier identity from one issued for the current identity.
//!
//! Nothing here returns an error. Storage problems degrade to "logged out",
//! and login/registration failures go to the [`Notifier`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{info, warn};

use ai_store_core::Identity;

use crate::api::ApiClient;
use crate::notify::{Notifier, failure_message, messages};
use crate::storage::Storage;
use crate::ui_config::UiConfigStore;

/// Storage key for the persisted identity.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// The identity as of one change, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    /// Bumped every time the current account changes.
    pub generation: u64,
}

/// The session store.
///
/// Cheaply cloneable; clones share state. Create one at startup and hand
/// clones to whatever needs the identity.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    ui_config: UiConfigStore,
    state: watch::Sender<SessionSnapshot>,
    loading: AtomicBool,
}

impl SessionStore {
    /// Create a logged-out session store. Call [`restore`](Self::restore)
    /// before relying on the identity.
    #[must_use]
    pub fn new(
        api: ApiClient,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        ui_config: UiConfigStore,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(SessionInner {
                api,
                storage,
                notifier,
                ui_config,
                state,
                loading: AtomicBool::new(true),
            }),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The current identity, if logged in.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.inner.state.borrow().identity.clone()
    }

    /// The current identity and its generation.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Generation of the current identity.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().identity.is_some()
    }

    /// True until [`restore`](Self::restore) has finished.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire)
    }

    /// Receive every identity change.
    ///
    /// The receiver starts with the current snapshot marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// The UI configuration this session drives.
    #[must_use]
    pub fn ui_config(&self) -> &UiConfigStore {
        &self.inner.ui_config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load the persisted identity, if there is a usable one.
    ///
    /// Unreadable, malformed or incomplete records are deleted and the session
    /// stays logged out.
    pub async fn restore(&self) {
        match self.inner.storage.get(CURRENT_USER_KEY).await {
            Ok(Some(raw)) => match parse_stored(&raw) {
                Ok(identity) => {
                    info!(email = %identity.email, "restored session");
                    self.apply_variant(&identity);
                    self.set_identity(Some(identity));
                }
                Err(reason) => {
                    warn!(%reason, "discarding stored session");
                    self.clear_persisted().await;
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to read stored session");
                self.clear_persisted().await;
            }
        }
        self.inner.loading.store(false, Ordering::Release);
    }

    /// Log in. Returns whether it succeeded.
    ///
    /// On failure an alert is shown and the previous identity is kept.
    pub async fn login(&self, email: &str, password: &SecretString) -> bool {
        match self.inner.api.login(email, password).await {
            Ok(identity) => {
                self.sign_in(identity).await;
                true
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.inner.notifier.alert(
                    messages::LOGIN_FAILED,
                    &failure_message(&err, messages::LOGIN_FALLBACK),
                );
                false
            }
        }
    }

    /// Register a new account and log in as it. Returns whether it succeeded.
    ///
    /// On failure an alert is shown and the previous identity is kept.
    pub async fn register(&self, email: &str, name: &str, password: &SecretString) -> bool {
        match self.inner.api.register(email, name, password).await {
            Ok(identity) => {
                self.sign_in(identity).await;
                true
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                self.inner.notifier.alert(
                    messages::REGISTER_FAILED,
                    &failure_message(&err, messages::REGISTER_FALLBACK),
                );
                false
            }
        }
    }

    /// Log out. Always succeeds.
    pub async fn logout(&self) {
        self.clear_persisted().await;
        self.set_identity(None);
        self.inner.ui_config.reset();
        info!("logged out");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn sign_in(&self, identity: Identity) {
        info!(email = %identity.email, "signed in");
        self.apply_variant(&identity);
        self.set_identity(Some(identity.clone()));

        // Persist failures never fail the sign-in
        match serde_json::to_string(&identity) {
            Ok(serialized) => {
                if let Err(e) = self
                    .inner
                    .storage
                    .set(CURRENT_USER_KEY, &serialized)
                    .await
                {
                    warn!(error = %e, "failed to persist session");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize session"),
        }
    }

    fn apply_variant(&self, identity: &Identity) {
        if let Some(variant) = &identity.variant {
            self.inner.ui_config.set(variant.clone());
        }
    }

    /// Replace the identity. Subscribers are only woken, and the generation
    /// only bumped, when the account changes.
    fn set_identity(&self, identity: Option<Identity>) {
        self.inner.state.send_if_modified(|snapshot| {
            let same_account = match (&snapshot.identity, &identity) {
                (Some(old), Some(new)) => old.email == new.email,
                (None, None) => true,
                _ => false,
            };
            snapshot.identity = identity;
            if same_account {
                return false;
            }
            snapshot.generation += 1;
            true
        });
    }

    async fn clear_persisted(&self) {
        if let Err(e) = self.inner.storage.remove(CURRENT_USER_KEY).await {
            warn!(error = %e, "failed to clear stored session");
        }
    }
}

fn parse_stored(raw: &str) -> Result<Identity, String> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Identity::sanitize(&value).map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::{MemoryStorage, StorageError};

    /// Storage whose reads always fail.
    struct BrokenStorage {
        removed: AtomicBool,
    }

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            self.removed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn session_with(storage: Arc<dyn Storage>) -> SessionStore {
        // Never contacted by these tests
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        SessionStore::new(
            api,
            storage,
            Arc::new(RecordingNotifier::new()),
            UiConfigStore::new(),
        )
    }

    #[tokio::test]
    async fn test_restore_valid_record() {
        let storage = Arc::new(MemoryStorage::with_entry(
            CURRENT_USER_KEY,
            r#"{"email":"a@b.com","name":"A"}"#,
        ));
        let session = session_with(storage);
        assert!(session.is_loading());

        session.restore().await;

        assert!(!session.is_loading());
        assert!(session.is_authenticated());
        let identity = session.current().unwrap();
        assert_eq!(identity.email.as_str(), "a@b.com");
        assert_eq!(identity.name, "A");
        assert_eq!(session.generation(), 1);
    }

    #[tokio::test]
    async fn test_restore_incomplete_record_clears_storage() {
        let storage = Arc::new(MemoryStorage::with_entry(CURRENT_USER_KEY, "{}"));
        let session = session_with(storage.clone());

        session.restore().await;

        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert_eq!(storage.peek(CURRENT_USER_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_malformed_json_clears_storage() {
        let storage = Arc::new(MemoryStorage::with_entry(CURRENT_USER_KEY, "{not json"));
        let session = session_with(storage.clone());

        session.restore().await;

        assert!(!session.is_authenticated());
        assert_eq!(storage.peek(CURRENT_USER_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_read_error_clears_storage() {
        let storage = Arc::new(BrokenStorage {
            removed: AtomicBool::new(false),
        });
        let session = session_with(storage.clone());

        session.restore().await;

        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert!(storage.removed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_restore_empty_storage() {
        let session = session_with(Arc::new(MemoryStorage::new()));
        session.restore().await;
        assert!(!session.is_authenticated());
        assert_eq!(session.generation(), 0);
    }

    #[tokio::test]
    async fn test_restore_applies_variant() {
        let record = json!({
            "email": "a@b.com",
            "name": "A",
            "variant": {"primaryColor": "#22aa55", "showDiscount": true}
        });
        let storage = Arc::new(MemoryStorage::with_entry(
            CURRENT_USER_KEY,
            &record.to_string(),
        ));
        let session = session_with(storage);

        session.restore().await;

        let ui = session.ui_config().current();
        assert_eq!(ui.primary_color, "#22aa55");
        assert!(ui.show_discount);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let record = json!({
            "email": "a@b.com",
            "name": "A",
            "variant": {"showDiscount": true}
        });
        let storage = Arc::new(MemoryStorage::with_entry(
            CURRENT_USER_KEY,
            &record.to_string(),
        ));
        let session = session_with(storage.clone());
        session.restore().await;
        let mut rx = session.subscribe();

        session.logout().await;

        assert!(!session.is_authenticated());
        assert_eq!(storage.peek(CURRENT_USER_KEY), None);
        assert_eq!(session.ui_config().current(), ai_store_core::UiVariationConfig::default());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().generation, 2);
    }

    #[tokio::test]
    async fn test_logout_when_logged_out_does_not_notify() {
        let session = session_with(Arc::new(MemoryStorage::new()));
        let rx = session.subscribe();
        session.logout().await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(session.generation(), 0);
    }
}
