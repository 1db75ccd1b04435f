//! Command implementations and the shared client wiring.

pub mod account;
pub mod cart;
pub mod catalog;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use ai_store_client::experiment::{LoggingEventSink, StaticDecisions};
use ai_store_client::notify::Notifier;
use ai_store_client::{
    ApiClient, ApiError, CatalogStore, ClientConfig, ConfigError, FileStorage, SessionStore,
    UiConfigStore,
};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store API failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Decisions file could not be read.
    #[error("Failed to read decisions file {path}: {source}")]
    DecisionsIo {
        path: String,
        source: std::io::Error,
    },

    /// Decisions file is not valid JSON.
    #[error("Invalid decisions file {path}: {source}")]
    DecisionsFormat {
        path: String,
        source: serde_json::Error,
    },

    /// The command needs a logged-in account.
    #[error("Not logged in")]
    NotLoggedIn,

    /// No product with this ID in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// The action failed and an alert was already shown.
    #[error("{0} failed")]
    Failed(&'static str),
}

/// Prints alerts to stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    #[allow(clippy::print_stderr)]
    fn alert(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}

/// Everything a command needs, wired from configuration.
pub struct App {
    pub session: SessionStore,
    pub store: CatalogStore,
    pub decisions: StaticDecisions,
}

impl App {
    /// Build the client from the environment and restore the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the decisions file is invalid.
    pub async fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        tracing::debug!(
            api_base_url = %config.api_base_url,
            platform = ?config.platform,
            "loaded configuration"
        );

        let decisions = match &config.decisions_file {
            Some(path) => load_decisions(path)?,
            None => StaticDecisions::new(),
        };

        let api = ApiClient::new(&config.api_base_url)?;
        let notifier: Arc<dyn Notifier> = Arc::new(StderrNotifier);
        let session = SessionStore::new(
            api.clone(),
            Arc::new(FileStorage::new(config.data_dir)),
            Arc::clone(&notifier),
            UiConfigStore::new(),
        );
        session.restore().await;

        let store = CatalogStore::new(api, session.clone(), notifier, Arc::new(LoggingEventSink));

        Ok(Self {
            session,
            store,
            decisions,
        })
    }

    /// Fail unless someone is logged in.
    pub fn require_login(&self) -> Result<(), CliError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotLoggedIn)
        }
    }
}

fn load_decisions(path: &Path) -> Result<StaticDecisions, CliError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::DecisionsIo {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::DecisionsFormat {
        path: display,
        source,
    })
}
