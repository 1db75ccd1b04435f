//! Mapping from the session identity to an experiment user.

use serde::Serialize;
use serde_json::{Map, Value};

use ai_store_core::Identity;

/// Experiment user ID for logged-out sessions.
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// The user the decision provider buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentUser {
    pub id: String,
    pub attributes: Map<String, Value>,
}

impl ExperimentUser {
    /// Build the experiment user for the current identity.
    ///
    /// Logged-in users get a stable, opaque ID derived from their email plus
    /// coarse attributes for targeting.
    #[must_use]
    pub fn from_identity(identity: Option<&Identity>) -> Self {
        let Some(identity) = identity else {
            let mut attributes = Map::new();
            attributes.insert("is_logged_in".to_string(), Value::Bool(false));
            return Self {
                id: ANONYMOUS_USER_ID.to_string(),
                attributes,
            };
        };

        let email = identity.email.as_str().trim().to_lowercase();
        let seed = if !email.is_empty() {
            email.as_str()
        } else if !identity.name.is_empty() {
            identity.name.as_str()
        } else {
            "unknown"
        };
        let id = format!("uid_{}", fnv1a32_hex(seed));

        let mut attributes = Map::new();
        attributes.insert("is_logged_in".to_string(), Value::Bool(true));
        attributes.insert("$opt_bucketing_id".to_string(), Value::String(id.clone()));
        if let Some((_, domain)) = email.split_once('@') {
            attributes.insert("email_domain".to_string(), Value::String(domain.to_string()));
        }
        if let Some(country) = &identity.country {
            attributes.insert("country".to_string(), Value::String(country.clone()));
        }

        Self { id, attributes }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }
}

/// 32-bit FNV-1a over UTF-16 code units, as zero-padded lowercase hex.
fn fnv1a32_hex(input: &str) -> String {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let hash = input.encode_utf16().fold(OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(PRIME)
    });
    format!("{hash:08x}")
}
