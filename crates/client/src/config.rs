//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `AI_STORE_API_BASE_URL` - Base address of the store API. A trailing `/`
//!   is stripped. Defaults depend on `AI_STORE_PLATFORM`.
//! - `AI_STORE_PLATFORM` - `simulator` (default) or `emulator`. Simulators
//!   share the host's loopback interface; emulators reach the host through
//!   the `10.0.2.2` alias.
//! - `AI_STORE_DATA_DIR` - Directory for the persisted session (default: `.ai-store`)
//! - `AI_STORE_DECISIONS_FILE` - JSON file with static experiment decisions

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Default API address when the API runs on the same host.
pub const SIMULATOR_API_BASE_URL: &str = "http://localhost:3000/api";

/// Default API address from inside an emulator (host loopback alias).
pub const EMULATOR_API_BASE_URL: &str = "http://10.0.2.2:3000/api";

const DEFAULT_DATA_DIR: &str = ".ai-store";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the client runs, which decides the default API address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Same network namespace as the host (desktop, iOS simulator).
    #[default]
    Simulator,
    /// Virtualized device that reaches the host through an alias address.
    Emulator,
}

impl Platform {
    /// Default API base address for this platform.
    #[must_use]
    pub const fn default_api_base_url(self) -> &'static str {
        match self {
            Self::Simulator => SIMULATOR_API_BASE_URL,
            Self::Emulator => EMULATOR_API_BASE_URL,
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulator" | "ios" | "desktop" => Ok(Self::Simulator),
            "emulator" | "android" => Ok(Self::Emulator),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// Store client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the store API, without a trailing slash
    pub api_base_url: String,
    /// Platform the client runs on
    pub platform: Platform,
    /// Directory holding the persisted session record
    pub data_dir: PathBuf,
    /// Static experiment decisions to load, if any
    pub decisions_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let platform = match non_empty(lookup("AI_STORE_PLATFORM")) {
            Some(raw) => raw
                .parse::<Platform>()
                .map_err(|e| ConfigError::InvalidEnvVar("AI_STORE_PLATFORM".to_string(), e))?,
            None => Platform::default(),
        };

        let api_base_url = match non_empty(lookup("AI_STORE_API_BASE_URL")) {
            Some(raw) => normalize_base_url(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("AI_STORE_API_BASE_URL".to_string(), e.to_string())
            })?,
            None => platform.default_api_base_url().to_string(),
        };

        let data_dir = non_empty(lookup("AI_STORE_DATA_DIR"))
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let decisions_file = non_empty(lookup("AI_STORE_DECISIONS_FILE")).map(PathBuf::from);

        Ok(Self {
            api_base_url,
            platform,
            data_dir,
            decisions_file,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate a base address and strip trailing slashes.
///
/// # Errors
///
/// Returns an error if the address is not an absolute URL.
pub fn normalize_base_url(raw: &str) -> Result<String, url::ParseError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed)?;
    Ok(trimmed.to_string())
}
