//! The authenticated user record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::email::Email;
use super::ui_config::UiVariationConfig;

/// Why a raw user payload could not become an [`Identity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The payload is not a JSON object.
    #[error("user record is not an object")]
    NotAnObject,
    /// Email or name is missing or empty.
    #[error("user record is missing {0}")]
    Missing(&'static str),
}

/// The current authenticated user.
///
/// Held in memory by the session store and in one persisted slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: Email,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// UI variation assigned to this user, if the server attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<UiVariationConfig>,
}

impl Identity {
    /// Build an identity from a loosely-typed user payload.
    ///
    /// Both the login/register responses and the persisted record go through
    /// here. Scalars are coerced to strings, `null` and missing fields count as
    /// empty, an empty `country` is dropped and an unreadable `variant` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object, or if `email` or
    /// `name` is empty after coercion. The email itself is kept verbatim.
    pub fn sanitize(raw: &Value) -> Result<Self, IdentityError> {
        let Value::Object(fields) = raw else {
            return Err(IdentityError::NotAnObject);
        };

        let email = fields
            .get("email")
            .map(coerce_string)
            .and_then(|raw| Email::parse(&raw).ok())
            .ok_or(IdentityError::Missing("email"))?;
        let name = fields.get("name").map(coerce_string).unwrap_or_default();
        if name.is_empty() {
            return Err(IdentityError::Missing("name"));
        }

        let country = fields
            .get("country")
            .map(coerce_string)
            .filter(|c| !c.is_empty());

        let variant = fields
            .get("variant")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        Ok(Self {
            email,
            name,
            country,
            variant,
        })
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_complete_record() {
        let identity =
            Identity::sanitize(&json!({"email": "a@b.com", "name": "A", "country": "KR"})).unwrap();
        assert_eq!(identity.email.as_str(), "a@b.com");
        assert_eq!(identity.name, "A");
        assert_eq!(identity.country.as_deref(), Some("KR"));
        assert!(identity.variant.is_none());
    }

    #[test]
    fn test_sanitize_drops_unknown_fields_and_empty_country() {
        let identity = Identity::sanitize(&json!({
            "email": "a@b.com",
            "name": "A",
            "country": "",
            "password": "hunter2"
        }))
        .unwrap();
        assert!(identity.country.is_none());
        let stored = serde_json::to_value(&identity).unwrap();
        assert_eq!(stored, json!({"email": "a@b.com", "name": "A"}));
    }

    #[test]
    fn test_sanitize_rejects_incomplete() {
        assert_eq!(
            Identity::sanitize(&json!({})),
            Err(IdentityError::Missing("email"))
        );
        assert_eq!(
            Identity::sanitize(&json!({"email": "a@b.com", "name": null})),
            Err(IdentityError::Missing("name"))
        );
        assert_eq!(
            Identity::sanitize(&json!("a@b.com")),
            Err(IdentityError::NotAnObject)
        );
    }

    #[test]
    fn test_sanitize_keeps_email_verbatim() {
        let mixed = Identity::sanitize(&json!({"email": "Alice@Shop.test", "name": "Alice"})).unwrap();
        assert_eq!(mixed.email.as_str(), "Alice@Shop.test");

        let guest = Identity::sanitize(&json!({"email": "guest", "name": "Guest"})).unwrap();
        assert_eq!(guest.email.as_str(), "guest");

        assert_eq!(
            Identity::sanitize(&json!({"email": "  ", "name": "N"})),
            Err(IdentityError::Missing("email"))
        );
    }

    #[test]
    fn test_sanitize_keeps_variant() {
        let identity = Identity::sanitize(&json!({
            "email": "a@b.com",
            "name": "A",
            "variant": {"theme": "warm", "primaryColor": "#ff6600"}
        }))
        .unwrap();
        let variant = identity.variant.unwrap();
        assert_eq!(variant.theme, "warm");
        assert_eq!(variant.primary_color, "#ff6600");
        assert!(!variant.show_discount);
    }

    #[test]
    fn test_sanitize_ignores_unreadable_variant() {
        let identity = Identity::sanitize(&json!({
            "email": "a@b.com",
            "name": "A",
            "variant": {"showDiscount": "maybe"}
        }))
        .unwrap();
        assert!(identity.variant.is_none());
    }
}
